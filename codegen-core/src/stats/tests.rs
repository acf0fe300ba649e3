use super::*;
use crate::history::InMemoryHistoryStore;
use crate::history::tests::{failed, successful};
use crate::testing::OfflineStore;

async fn seeded() -> (StatisticsService, Arc<InMemoryHistoryStore>) {
    let store = Arc::new(InMemoryHistoryStore::new());
    for record in [
        successful("Sort numbers", "Java", 100),
        successful("Read a file", "Python", 50),
        successful("Write a test", "java", 151),
        failed("Parse JSON", "Rust", "upstream timeout", 30_000),
    ] {
        store.save(record).await.unwrap();
    }
    let service = StatisticsService::new(store.clone(), Duration::from_secs(60));
    (service, store)
}

#[test]
fn test_clamp_limit() {
    assert_eq!(clamp_limit(0), 10);
    assert_eq!(clamp_limit(-5), 10);
    assert_eq!(clamp_limit(1), 1);
    assert_eq!(clamp_limit(100), 100);
    assert_eq!(clamp_limit(500), 100);
    assert_eq!(clamp_limit(i64::MAX), 100);
}

#[test]
fn test_success_rate() {
    assert_eq!(success_rate(0, 0), 0.0);
    assert_eq!(success_rate(3, 4), 75.0);
    assert_eq!(success_rate(1, 3), 33.33);
    assert_eq!(success_rate(2, 3), 66.67);
}

#[tokio::test]
async fn test_summary() {
    let (service, _) = seeded().await;
    let summary = service.summary().await;

    assert_eq!(summary.total_generations, 4);
    assert_eq!(summary.successful_generations, 3);
    assert_eq!(summary.failed_generations, 1);
    assert_eq!(summary.success_rate, 75.0);
    // (100 + 50 + 151) / 3
    assert_eq!(summary.average_execution_time_ms, 100.33);
    assert_eq!(summary.language_usage.len(), 3);
}

#[tokio::test]
async fn test_empty_ledger_summary() {
    let service = StatisticsService::new(Arc::new(InMemoryHistoryStore::new()), Duration::from_secs(5));
    let summary = service.summary().await;

    assert_eq!(summary.total_generations, 0);
    assert_eq!(summary.success_rate, 0.0);
    assert_eq!(summary.average_execution_time_ms, 0.0);
    assert!(summary.language_usage.is_empty());
}

#[tokio::test]
async fn test_cached_counts_are_stale_until_expiry() {
    let (service, store) = seeded().await;
    assert_eq!(service.total_generations().await, 4);

    store.save(successful("One more", "Go", 10)).await.unwrap();

    // Cached aggregates ignore the write, uncached ones see it
    assert_eq!(service.total_generations().await, 4);
    assert_eq!(service.all_history().await.len(), 5);
    assert_eq!(service.failed_generations().await, 1);
    assert_eq!(service.recent_history(50).await.len(), 5);

    service.cache().clear();
    assert_eq!(service.total_generations().await, 5);
}

#[tokio::test]
async fn test_short_ttl_expires() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let service = StatisticsService::new(store.clone(), Duration::from_millis(20));

    assert_eq!(service.successful_generations().await, 0);
    store.save(successful("Hello", "Go", 10)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(40)).await;

    assert_eq!(service.successful_generations().await, 1);
}

#[tokio::test]
async fn test_history_by_language() {
    let (service, _) = seeded().await;

    let java = service.history_by_language("JAVA").await;
    assert_eq!(java.len(), 2);
    assert_eq!(java[0].user_prompt, "Write a test");

    assert!(service.history_by_language("   ").await.is_empty());
    assert!(service.cache().get(&CacheKey::by_language("java")).is_some());
}

#[tokio::test]
async fn test_search_trims_and_ignores_blank() {
    let (service, _) = seeded().await;

    assert_eq!(service.search_history("  read  ").await.len(), 1);
    assert!(service.search_history("").await.is_empty());
    assert!(service.search_history("   ").await.is_empty());
}

#[tokio::test]
async fn test_recent_history_clamps() {
    let (service, _) = seeded().await;

    assert_eq!(service.recent_history(2).await.len(), 2);
    assert_eq!(service.recent_history(0).await.len(), 4);
    assert_eq!(service.recent_history(-1).await[0].user_prompt, "Parse JSON");
}

#[tokio::test]
async fn test_detailed_includes_last_day() {
    let (service, _) = seeded().await;
    let detailed = service.detailed().await;

    assert_eq!(detailed.recent_history.len(), 4);

    let value = serde_json::to_value(&detailed).unwrap();
    assert_eq!(value["totalGenerations"], 4);
    assert!(value["recentHistory"].is_array());
}

#[tokio::test]
async fn test_storage_failures_degrade() {
    let service = StatisticsService::new(Arc::new(OfflineStore), Duration::from_secs(5));

    let summary = service.summary().await;
    assert_eq!(summary.total_generations, 0);
    assert_eq!(summary.success_rate, 0.0);
    assert!(service.all_history().await.is_empty());
    assert!(service.history_record(1).await.is_none());
    assert!(service.probe().await.is_err());

    // Failures are not cached
    assert!(service.cache().is_empty());
}
