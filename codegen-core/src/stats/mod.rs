//! Aggregates and listings over the generation ledger
//!
//! Read paths never fail: a storage error is logged and the caller gets an
//! empty list or zero. [`StatisticsService::probe`] is the one exception, for
//! health checks that need to see the failure.

pub mod cache;

pub use cache::{CacheKey, CachedValue, StatsCache};

use crate::history::{HistoryRecord, HistoryStore, LanguageUsageStat, StorageError};
use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const MAX_RECENT_LIMIT: usize = 100;

/// Headline numbers for the whole ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_generations: u64,
    pub successful_generations: u64,
    pub failed_generations: u64,
    pub average_execution_time_ms: f64,
    /// Percentage, two decimals
    pub success_rate: f64,
    pub language_usage: Vec<LanguageUsageStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStats {
    #[serde(flatten)]
    pub summary: StatsSummary,
    /// Records from the last 24 hours
    pub recent_history: Vec<HistoryRecord>,
}

/// Requested page size → what will actually be returned
pub fn clamp_limit(requested: i64) -> usize {
    if requested <= 0 {
        DEFAULT_RECENT_LIMIT
    } else {
        usize::try_from(requested).unwrap_or(MAX_RECENT_LIMIT).min(MAX_RECENT_LIMIT)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of successful attempts, 0.0 for an empty ledger
pub fn success_rate(successful: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(successful as f64 / total as f64 * 100.0)
}

pub struct StatisticsService {
    store: Arc<dyn HistoryStore>,
    cache: StatsCache,
}

impl StatisticsService {
    pub fn new(store: Arc<dyn HistoryStore>, ttl: Duration) -> Self {
        Self { store, cache: StatsCache::new(ttl) }
    }

    pub fn cache(&self) -> &StatsCache {
        &self.cache
    }

    async fn cached_count<F>(&self, key: CacheKey, what: &str, load: F) -> u64
    where
        F: Future<Output = Result<u64, StorageError>>,
    {
        if let Some(CachedValue::Count(count)) = self.cache.get(&key) {
            return count;
        }
        match load.await {
            Ok(count) => {
                self.cache.insert(key, CachedValue::Count(count));
                count
            }
            Err(e) => {
                error!("Failed to count {}: {}", what, e);
                0
            }
        }
    }

    async fn cached_records<F>(&self, key: CacheKey, what: &str, load: F) -> Vec<HistoryRecord>
    where
        F: Future<Output = Result<Vec<HistoryRecord>, StorageError>>,
    {
        if let Some(CachedValue::Records(records)) = self.cache.get(&key) {
            return records.as_ref().clone();
        }
        match load.await {
            Ok(records) => {
                self.cache.insert(key, CachedValue::Records(Arc::new(records.clone())));
                records
            }
            Err(e) => {
                error!("Failed to load {}: {}", what, e);
                Vec::new()
            }
        }
    }

    fn degrade<T: Default>(result: Result<T, StorageError>, what: &str) -> T {
        result.unwrap_or_else(|e| {
            error!("Failed to load {}: {}", what, e);
            T::default()
        })
    }

    pub async fn total_generations(&self) -> u64 {
        self.cached_count(CacheKey::Total, "generations", self.store.count_total()).await
    }

    pub async fn successful_generations(&self) -> u64 {
        self.cached_count(
            CacheKey::Successful,
            "successful generations",
            self.store.count_successful(),
        )
        .await
    }

    pub async fn failed_generations(&self) -> u64 {
        Self::degrade(self.store.count_failed().await, "failed generation count")
    }

    /// Mean over successful attempts; `None` when there are none
    pub async fn average_execution_time(&self) -> Option<f64> {
        Self::degrade(
            self.store.average_execution_time_of_successful().await,
            "average execution time",
        )
    }

    pub async fn all_history(&self) -> Vec<HistoryRecord> {
        self.cached_records(CacheKey::AllHistory, "history", self.store.all()).await
    }

    pub async fn history_by_language(&self, language: &str) -> Vec<HistoryRecord> {
        let language = language.trim();
        if language.is_empty() {
            return Vec::new();
        }
        self.cached_records(
            CacheKey::by_language(language),
            "history by language",
            self.store.by_language(language),
        )
        .await
    }

    /// At most `clamp_limit(limit)` records, most recent first
    pub async fn recent_history(&self, limit: i64) -> Vec<HistoryRecord> {
        let limit = clamp_limit(limit);
        Self::degrade(self.store.recent(limit).await, "recent history")
    }

    pub async fn search_history(&self, keyword: &str) -> Vec<HistoryRecord> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }
        Self::degrade(self.store.search(keyword).await, "search results")
    }

    /// Records created in the last 24 hours, most recent first
    pub async fn recent_activity(&self) -> Vec<HistoryRecord> {
        let since = Utc::now() - ChronoDuration::hours(24);
        Self::degrade(self.store.since(since).await, "recent activity")
    }

    pub async fn language_usage(&self) -> Vec<LanguageUsageStat> {
        Self::degrade(self.store.language_usage_stats().await, "language usage")
    }

    pub async fn history_record(&self, id: i64) -> Option<HistoryRecord> {
        Self::degrade(self.store.find_by_id(id).await, "history record")
    }

    pub async fn summary(&self) -> StatsSummary {
        let total = self.total_generations().await;
        let successful = self.successful_generations().await;
        let failed = self.failed_generations().await;
        let average = self.average_execution_time().await.map(round2).unwrap_or(0.0);
        let language_usage = self.language_usage().await;
        debug!("Stats summary: {} total, {} successful", total, successful);

        StatsSummary {
            total_generations: total,
            successful_generations: successful,
            failed_generations: failed,
            average_execution_time_ms: average,
            success_rate: success_rate(successful, total),
            language_usage,
        }
    }

    pub async fn detailed(&self) -> DetailedStats {
        DetailedStats { summary: self.summary().await, recent_history: self.recent_activity().await }
    }

    /// Uncached count that surfaces storage failures
    pub async fn probe(&self) -> Result<u64, StorageError> {
        self.store.count_total().await
    }
}

#[cfg(test)]
mod tests;
