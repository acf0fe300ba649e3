//! Append-only ledger of generation attempts
//!
//! Every attempt that passes validation is written here exactly once,
//! successful or not. Records are never updated or deleted.
//!
//! Language and keyword matching fold ASCII case only, so both backends
//! agree with SQLite's built-in `lower()`.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage task failed: {0}")]
    Task(String),

    #[error("Corrupt record {id}: {message}")]
    Corrupt { id: i64, message: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A persisted generation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Assigned by the store
    pub id: i64,
    pub user_prompt: String,
    pub programming_language: String,
    pub generated_code: Option<String>,
    /// Assigned by the store when the record is saved
    pub created_at: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Everything the caller owns about a record, before the store assigns
/// identity and creation time
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub user_prompt: String,
    pub programming_language: String,
    pub generated_code: Option<String>,
    pub execution_time_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}

impl NewHistoryRecord {
    fn into_record(self, id: i64, created_at: DateTime<Utc>) -> HistoryRecord {
        HistoryRecord {
            id,
            user_prompt: self.user_prompt,
            programming_language: self.programming_language,
            generated_code: self.generated_code,
            created_at,
            execution_time_ms: self.execution_time_ms,
            success: self.success,
            error_message: self.error_message,
        }
    }
}

/// Per-language usage over successful records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageUsageStat {
    pub language: String,
    pub count: u64,
    pub average_execution_time_ms: f64,
}

/// Storage backend for the generation ledger
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a record and return it with its assigned id and timestamp
    async fn save(&self, record: NewHistoryRecord) -> Result<HistoryRecord>;

    async fn find_by_id(&self, id: i64) -> Result<Option<HistoryRecord>>;

    /// All records in insertion order
    async fn all(&self) -> Result<Vec<HistoryRecord>>;

    /// Up to `limit` records, most recent first
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>>;

    /// Records created at or after `since`, most recent first
    async fn since(&self, since: DateTime<Utc>) -> Result<Vec<HistoryRecord>>;

    /// Records whose language matches ignoring ASCII case, most recent first
    async fn by_language(&self, language: &str) -> Result<Vec<HistoryRecord>>;

    /// Records whose prompt contains `keyword` ignoring ASCII case, most recent first
    async fn search(&self, keyword: &str) -> Result<Vec<HistoryRecord>>;

    async fn count_total(&self) -> Result<u64>;

    async fn count_successful(&self) -> Result<u64>;

    async fn count_failed(&self) -> Result<u64>;

    /// `None` when there are no successful records
    async fn average_execution_time_of_successful(&self) -> Result<Option<f64>>;

    /// Successful records grouped by language, by count desc then name asc
    async fn language_usage_stats(&self) -> Result<Vec<LanguageUsageStat>>;
}

/// Most recent first: creation time desc, then id desc
pub(crate) fn sort_most_recent_first(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Group successful records by language
pub(crate) fn language_usage<'a>(
    records: impl IntoIterator<Item = &'a HistoryRecord>,
) -> Vec<LanguageUsageStat> {
    let mut groups: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for record in records.into_iter().filter(|r| r.success) {
        let entry = groups.entry(record.programming_language.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += record.execution_time_ms;
    }

    let mut stats: Vec<LanguageUsageStat> = groups
        .into_iter()
        .map(|(language, (count, total_ms))| LanguageUsageStat {
            language: language.to_string(),
            count,
            average_execution_time_ms: total_ms as f64 / count as f64,
        })
        .collect();

    // BTreeMap already yields names ascending; the sort is stable
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}
