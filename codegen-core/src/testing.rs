//! Test doubles shared with dependent crates

use crate::history::{
    HistoryRecord, HistoryStore, LanguageUsageStat, NewHistoryRecord, Result, StorageError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;

/// Ledger whose every call fails as if the database were unreachable
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineStore;

fn offline<T>() -> Result<T> {
    Err(StorageError::Io(io::Error::new(io::ErrorKind::NotConnected, "database offline")))
}

#[async_trait]
impl HistoryStore for OfflineStore {
    async fn save(&self, _: NewHistoryRecord) -> Result<HistoryRecord> {
        offline()
    }
    async fn find_by_id(&self, _: i64) -> Result<Option<HistoryRecord>> {
        offline()
    }
    async fn all(&self) -> Result<Vec<HistoryRecord>> {
        offline()
    }
    async fn recent(&self, _: usize) -> Result<Vec<HistoryRecord>> {
        offline()
    }
    async fn since(&self, _: DateTime<Utc>) -> Result<Vec<HistoryRecord>> {
        offline()
    }
    async fn by_language(&self, _: &str) -> Result<Vec<HistoryRecord>> {
        offline()
    }
    async fn search(&self, _: &str) -> Result<Vec<HistoryRecord>> {
        offline()
    }
    async fn count_total(&self) -> Result<u64> {
        offline()
    }
    async fn count_successful(&self) -> Result<u64> {
        offline()
    }
    async fn count_failed(&self) -> Result<u64> {
        offline()
    }
    async fn average_execution_time_of_successful(&self) -> Result<Option<f64>> {
        offline()
    }
    async fn language_usage_stats(&self) -> Result<Vec<LanguageUsageStat>> {
        offline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_call_fails() {
        let store = OfflineStore;
        let err = store.count_total().await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(err.to_string().contains("database offline"));
        assert!(store.all().await.is_err());
    }
}
