//! Durable ledger backed by SQLite
//!
//! rusqlite is blocking, so every call runs on tokio's blocking pool with
//! the connection behind a mutex.

use super::{
    HistoryRecord, HistoryStore, LanguageUsageStat, NewHistoryRecord, Result, StorageError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const SELECT_COLUMNS: &str = "SELECT id, user_prompt, programming_language, generated_code, \
     created_at_ms, execution_time_ms, success, error_message FROM code_history";

const MOST_RECENT_FIRST: &str = "ORDER BY created_at_ms DESC, id DESC";

/// Ledger stored in a single SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteHistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistoryStore {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn)?;
        info!("Opened history database at {}", path.display());
        Ok(store)
    }

    /// Database that lives only as long as the store
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard =
                conn.lock().map_err(|_| StorageError::Task("connection mutex poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }

    async fn query_records(
        &self,
        sql: String,
        param: Option<rusqlite::types::Value>,
    ) -> Result<Vec<HistoryRecord>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = match param {
                Some(value) => stmt.query_map(params![value], read_row)?,
                None => stmt.query_map([], read_row)?,
            };

            let mut records = Vec::new();
            for row in rows {
                records.push(row??);
            }
            Ok(records)
        })
        .await
    }

    async fn count_where(&self, predicate: &'static str) -> Result<u64> {
        self.with_conn(move |conn| {
            let sql = format!("SELECT COUNT(*) FROM code_history {predicate}");
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
        .await
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS code_history (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_prompt TEXT NOT NULL,
          programming_language TEXT NOT NULL,
          generated_code TEXT,
          created_at_ms INTEGER NOT NULL,
          execution_time_ms INTEGER NOT NULL,
          success INTEGER NOT NULL,
          error_message TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_code_history_created
          ON code_history(created_at_ms DESC, id DESC);
        CREATE INDEX IF NOT EXISTS idx_code_history_language
          ON code_history(programming_language);
        "#,
    )?;
    Ok(())
}

/// Decode a row; the outer result is rusqlite's, the inner one ours
fn read_row(row: &Row<'_>) -> rusqlite::Result<Result<HistoryRecord>> {
    let id: i64 = row.get(0)?;
    let created_at_ms: i64 = row.get(4)?;
    let execution_time_ms: i64 = row.get(5)?;

    let Some(created_at) = DateTime::<Utc>::from_timestamp_millis(created_at_ms) else {
        return Ok(Err(StorageError::Corrupt {
            id,
            message: format!("created_at_ms {created_at_ms} out of range"),
        }));
    };

    Ok(Ok(HistoryRecord {
        id,
        user_prompt: row.get(1)?,
        programming_language: row.get(2)?,
        generated_code: row.get(3)?,
        created_at,
        execution_time_ms: execution_time_ms.max(0) as u64,
        success: row.get(6)?,
        error_message: row.get(7)?,
    }))
}

/// Current time truncated to what the table can hold
fn now_millis() -> (i64, DateTime<Utc>) {
    let now = Utc::now();
    let ms = now.timestamp_millis();
    (ms, DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(now))
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn save(&self, record: NewHistoryRecord) -> Result<HistoryRecord> {
        self.with_conn(move |conn| {
            let (created_ms, created_at) = now_millis();
            conn.execute(
                "INSERT INTO code_history (user_prompt, programming_language, generated_code, \
                 created_at_ms, execution_time_ms, success, error_message) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.user_prompt,
                    record.programming_language,
                    record.generated_code,
                    created_ms,
                    record.execution_time_ms as i64,
                    record.success,
                    record.error_message,
                ],
            )?;

            let id = conn.last_insert_rowid();
            debug!("Saved history record {}", id);
            Ok(record.into_record(id, created_at))
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<HistoryRecord>> {
        self.with_conn(move |conn| {
            let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
            let found = conn.query_row(&sql, params![id], read_row).optional()?;
            found.transpose()
        })
        .await
    }

    async fn all(&self) -> Result<Vec<HistoryRecord>> {
        self.query_records(format!("{SELECT_COLUMNS} ORDER BY id ASC"), None).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_records(
            format!("{SELECT_COLUMNS} {MOST_RECENT_FIRST} LIMIT ?1"),
            Some(limit.into()),
        )
        .await
    }

    async fn since(&self, since: DateTime<Utc>) -> Result<Vec<HistoryRecord>> {
        self.query_records(
            format!("{SELECT_COLUMNS} WHERE created_at_ms >= ?1 {MOST_RECENT_FIRST}"),
            Some(since.timestamp_millis().into()),
        )
        .await
    }

    async fn by_language(&self, language: &str) -> Result<Vec<HistoryRecord>> {
        self.query_records(
            format!(
                "{SELECT_COLUMNS} WHERE lower(programming_language) = lower(?1) {MOST_RECENT_FIRST}"
            ),
            Some(language.to_string().into()),
        )
        .await
    }

    async fn search(&self, keyword: &str) -> Result<Vec<HistoryRecord>> {
        self.query_records(
            format!(
                "{SELECT_COLUMNS} WHERE instr(lower(user_prompt), lower(?1)) > 0 {MOST_RECENT_FIRST}"
            ),
            Some(keyword.to_string().into()),
        )
        .await
    }

    async fn count_total(&self) -> Result<u64> {
        self.count_where("").await
    }

    async fn count_successful(&self) -> Result<u64> {
        self.count_where("WHERE success = 1").await
    }

    async fn count_failed(&self) -> Result<u64> {
        self.count_where("WHERE success = 0").await
    }

    async fn average_execution_time_of_successful(&self) -> Result<Option<f64>> {
        self.with_conn(|conn| {
            let avg: Option<f64> = conn.query_row(
                "SELECT AVG(execution_time_ms) FROM code_history WHERE success = 1",
                [],
                |row| row.get(0),
            )?;
            Ok(avg)
        })
        .await
    }

    async fn language_usage_stats(&self) -> Result<Vec<LanguageUsageStat>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT programming_language, COUNT(*), AVG(execution_time_ms) \
                 FROM code_history WHERE success = 1 \
                 GROUP BY programming_language \
                 ORDER BY COUNT(*) DESC, programming_language ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok(LanguageUsageStat {
                    language: row.get(0)?,
                    count: count.max(0) as u64,
                    average_execution_time_ms: row.get(2)?,
                })
            })?;

            let mut stats = Vec::new();
            for row in rows {
                stats.push(row?);
            }
            Ok(stats)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::{failed, successful};

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");

        let saved = {
            let store = SqliteHistoryStore::open(&path).unwrap();
            store.save(successful("Sort a list", "Python", 12)).await.unwrap()
        };

        let store = SqliteHistoryStore::open(&path).unwrap();
        let found = store.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert_eq!(store.count_total().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_record_round_trips_nulls() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        let saved = store.save(failed("Broken", "Go", "upstream down", 40)).await.unwrap();

        let found = store.find_by_id(saved.id).await.unwrap().unwrap();
        assert!(found.generated_code.is_none());
        assert_eq!(found.error_message.as_deref(), Some("upstream down"));
        assert!(!found.success);
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_reported() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO code_history (user_prompt, programming_language, \
                     created_at_ms, execution_time_ms, success) VALUES ('p', 'Java', ?1, 1, 1)",
                    params![i64::MAX],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let err = store.all().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
