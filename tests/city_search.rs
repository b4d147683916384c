use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pointbridge::config::settings::{CityConfig, CitySourceKind};
use pointbridge::error::{GatewayError, Result};
use pointbridge::{City, CitySearchService, CitySource, StaticCitySource};

mod common;

/// Static source that counts fetches and can be switched to fail
#[derive(Default)]
struct CountingSource {
    inner: StaticCitySource,
    calls: AtomicUsize,
    failing: std::sync::atomic::AtomicBool,
}

impl CountingSource {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CitySource for CountingSource {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<City>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Network("lookup unavailable".to_string()));
        }
        self.inner.fetch(query, limit).await
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

fn service(ttl: chrono::Duration) -> (Arc<CountingSource>, CitySearchService) {
    let source = Arc::new(CountingSource::default());
    let service = CitySearchService::new(source.clone(), ttl);
    (source, service)
}

#[tokio::test]
async fn repeated_query_within_ttl_fetches_once() {
    let (source, service) = service(chrono::Duration::milliseconds(150));

    let first = service.search("Lon").await;
    let second = service.search("lON").await;
    assert_eq!(source.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(first[0].name, "London");

    tokio::time::sleep(Duration::from_millis(200)).await;
    let third = service.search("lon").await;
    assert_eq!(source.calls(), 2);
    assert_eq!(third, first);
}

#[tokio::test]
async fn short_queries_skip_the_source() {
    let (source, service) = service(chrono::Duration::seconds(300));
    assert!(service.search("").await.is_empty());
    assert!(service.search("L").await.is_empty());
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn failed_refresh_serves_stale_entry() {
    let (source, service) = service(chrono::Duration::milliseconds(50));
    let cached = service.search("dubai").await;
    assert_eq!(cached.len(), 1);

    tokio::time::sleep(Duration::from_millis(80)).await;
    source.fail();

    assert_eq!(service.search("Dubai").await, cached);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn failure_without_cache_is_empty() {
    let (source, service) = service(chrono::Duration::seconds(300));
    source.fail();
    assert!(service.search("paris").await.is_empty());

    let stats = service.cache_stats().await;
    assert_eq!(stats.size, 0);
}

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let (source, service) = service(chrono::Duration::seconds(300));
    service.search("tokyo").await;
    let stats = service.cache_stats().await;
    assert_eq!(stats.size, 1);
    assert_eq!(stats.entries[0].key, "cities:tokyo");
    assert_eq!(stats.entries[0].ttl_ms, Some(300_000));

    service.clear_cache().await;
    assert_eq!(service.cache_stats().await.size, 0);
    service.search("tokyo").await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn database_source_on_local_backend_degrades_to_empty() {
    let (db, _storage) = common::local_db();
    let config = CityConfig {
        source: CitySourceKind::Database,
        ..CityConfig::default()
    };
    let service = CitySearchService::from_config(&config, &db);

    assert!(service.search("manama").await.is_empty());
}

#[tokio::test]
async fn static_source_from_config() {
    let (db, _storage) = common::local_db();
    let service = CitySearchService::from_config(&CityConfig::default(), &db);

    let cities = service.search("doha").await;
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].country_code, "QA");
    assert!(cities[0].is_capital);
}
