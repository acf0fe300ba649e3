//! In-process ledger, used for ephemeral runs and tests

use super::{
    HistoryRecord, HistoryStore, LanguageUsageStat, NewHistoryRecord, Result, language_usage,
    sort_most_recent_first,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Ledger kept in memory; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
    next_id: AtomicI64,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, keep: impl Fn(&HistoryRecord) -> bool) -> Vec<HistoryRecord> {
        let records = self.records.read().await;
        let mut selected: Vec<HistoryRecord> = records.iter().filter(|r| keep(*r)).cloned().collect();
        sort_most_recent_first(&mut selected);
        selected
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn save(&self, record: NewHistoryRecord) -> Result<HistoryRecord> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let saved = record.into_record(id, Utc::now());

        self.records.write().await.push(saved.clone());
        debug!("Saved history record {}", id);
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<HistoryRecord>> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn all(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let mut records = self.select(|_| true).await;
        records.truncate(limit);
        Ok(records)
    }

    async fn since(&self, since: DateTime<Utc>) -> Result<Vec<HistoryRecord>> {
        Ok(self.select(|r| r.created_at >= since).await)
    }

    async fn by_language(&self, language: &str) -> Result<Vec<HistoryRecord>> {
        Ok(self.select(|r| r.programming_language.eq_ignore_ascii_case(language)).await)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<HistoryRecord>> {
        let needle = keyword.to_ascii_lowercase();
        Ok(self.select(|r| r.user_prompt.to_ascii_lowercase().contains(&needle)).await)
    }

    async fn count_total(&self) -> Result<u64> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn count_successful(&self) -> Result<u64> {
        Ok(self.records.read().await.iter().filter(|r| r.success).count() as u64)
    }

    async fn count_failed(&self) -> Result<u64> {
        Ok(self.records.read().await.iter().filter(|r| !r.success).count() as u64)
    }

    async fn average_execution_time_of_successful(&self) -> Result<Option<f64>> {
        let records = self.records.read().await;
        let times: Vec<u64> =
            records.iter().filter(|r| r.success).map(|r| r.execution_time_ms).collect();

        if times.is_empty() {
            return Ok(None);
        }
        Ok(Some(times.iter().sum::<u64>() as f64 / times.len() as f64))
    }

    async fn language_usage_stats(&self) -> Result<Vec<LanguageUsageStat>> {
        Ok(language_usage(self.records.read().await.iter()))
    }
}
