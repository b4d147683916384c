use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapter::Database;
use crate::config::constants::{
    CITY_CACHE_PREFIX, CITY_LOOKUP_TABLE, DEFAULT_CITY_CACHE_MAX_ENTRIES,
    DEFAULT_CITY_SEARCH_LIMIT, MAX_CITY_SEARCH_LIMIT, MIN_CITY_QUERY_LEN,
};
use crate::config::settings::{CityConfig, CitySourceKind};
use crate::error::{GatewayError, Result};
use crate::models::city::City;
use crate::query::QueryBuilder;
use crate::services::cities::builtin_cities;
use crate::storage::{CacheStats, MemoryCache};

/// Where city rows come from
#[async_trait]
pub trait CitySource: Send + Sync {
    /// Cities matching `query`, best matches first, at most `limit`
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<City>>;

    fn name(&self) -> &'static str;
}

/// Keep cities whose name, region or country contains `query`, rank
/// name-prefix matches first, then larger populations, and cut to `limit`.
pub fn rank_cities(cities: Vec<City>, query: &str, limit: usize) -> Vec<City> {
    let needle = query.to_lowercase();
    let mut matched: Vec<City> = cities.into_iter().filter(|c| c.matches(&needle)).collect();

    matched.sort_by(|a, b| {
        match (a.name_starts_with(&needle), b.name_starts_with(&needle)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => b.population.cmp(&a.population),
        }
    });
    matched.truncate(limit);
    matched
}

/// Built-in table of 40 cities
#[derive(Debug, Clone)]
pub struct StaticCitySource {
    cities: Vec<City>,
}

impl StaticCitySource {
    pub fn new() -> Self {
        Self {
            cities: builtin_cities(),
        }
    }

    pub fn with_cities(cities: Vec<City>) -> Self {
        Self { cities }
    }
}

impl Default for StaticCitySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CitySource for StaticCitySource {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<City>> {
        Ok(rank_cities(self.cities.clone(), query, limit))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// `cities_lookup` stores `city_name`/`country_name`; alias them onto [`City`]
const CITY_LOOKUP_COLUMNS: &str = "id,name:city_name,country:country_name,country_code,\
state_province,population,is_capital,latitude,longitude";

/// Reads `cities_lookup` through the database handle
#[derive(Debug, Clone)]
pub struct DatabaseCitySource {
    db: Database,
}

impl DatabaseCitySource {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Lookup query for `query`, largest cities first
    pub fn lookup_query(&self, query: &str, limit: usize) -> QueryBuilder {
        let term = sanitize_term(query);
        let expression = format!(
            "city_name.ilike.*{term}*,country_name.ilike.*{term}*,state_province.ilike.*{term}*"
        );

        self.db
            .from(CITY_LOOKUP_TABLE)
            .select(CITY_LOOKUP_COLUMNS)
            .or(&expression)
            .order("population", false)
            .limit(limit.clamp(1, MAX_CITY_SEARCH_LIMIT))
    }
}

/// Strip characters that would break a PostgREST `or=(...)` expression
fn sanitize_term(query: &str) -> String {
    query
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '%'))
        .collect()
}

#[async_trait]
impl CitySource for DatabaseCitySource {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<City>> {
        let limit = limit.clamp(1, MAX_CITY_SEARCH_LIMIT);
        let cities = self
            .lookup_query(query, limit)
            .execute()
            .await
            .decode::<Option<Vec<City>>>()
            .map_err(|e| GatewayError::ExternalService(e.to_string()))?
            .unwrap_or_default();
        Ok(rank_cities(cities, query, limit))
    }

    fn name(&self) -> &'static str {
        "database"
    }
}

/// City search with an in-process TTL cache.
///
/// Fresh cache hits skip the source. When the source fails, a stale entry for
/// the same query is served; without one the result is empty. Concurrent
/// identical queries may both reach the source.
pub struct CitySearchService {
    source: Arc<dyn CitySource>,
    cache: MemoryCache<Vec<City>>,
    limit: usize,
}

impl CitySearchService {
    pub fn new(source: Arc<dyn CitySource>, ttl: chrono::Duration) -> Self {
        Self {
            source,
            cache: MemoryCache::new(Some(ttl)).with_max_entries(DEFAULT_CITY_CACHE_MAX_ENTRIES),
            limit: DEFAULT_CITY_SEARCH_LIMIT,
        }
    }

    /// Cap the number of distinct queries kept in the cache
    pub fn with_cache_capacity(mut self, max_entries: usize) -> Self {
        self.cache = MemoryCache::new(self.cache.default_ttl()).with_max_entries(max_entries);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_CITY_SEARCH_LIMIT);
        self
    }

    /// Build the source named in `config`
    pub fn from_config(config: &CityConfig, db: &Database) -> Self {
        let source: Arc<dyn CitySource> = match config.source {
            CitySourceKind::Static => Arc::new(StaticCitySource::new()),
            CitySourceKind::Database => Arc::new(DatabaseCitySource::new(db.clone())),
        };
        info!("City search using {} source", source.name());
        Self::new(source, config.cache_ttl())
            .with_limit(config.limit)
            .with_cache_capacity(config.cache_max_entries)
    }

    fn cache_key(query: &str) -> String {
        format!("{}{}", CITY_CACHE_PREFIX, query.to_lowercase())
    }

    pub async fn search(&self, query: &str) -> Vec<City> {
        if query.chars().count() < MIN_CITY_QUERY_LEN {
            debug!("City query too short: {:?}", query);
            return Vec::new();
        }

        let key = Self::cache_key(query);
        if let Some(cached) = self.cache.get(&key).await {
            debug!("📦 Cache hit for cities: {}", query);
            return cached;
        }

        match self.source.fetch(query, self.limit).await {
            Ok(cities) => {
                debug!("🔍 City search for {:?} found {} cities", query, cities.len());
                self.cache.set(key, cities.clone(), None).await;
                cities
            }
            Err(e) => {
                warn!("❌ City search via {} failed: {}", self.source.name(), e);
                match self.cache.get_stale(&key).await {
                    Some(stale) => {
                        info!("📦 Serving stale cities for: {}", query);
                        stale
                    }
                    None => Vec::new(),
                }
            }
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("🗑️ City cache cleared");
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::response::Envelope;

    async fn names(source: &StaticCitySource, query: &str) -> Vec<String> {
        source
            .fetch(query, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[tokio::test]
    async fn test_prefix_matches_rank_first() {
        let source = StaticCitySource::new();
        // "San" prefixes three cities; none match only by region or country
        assert_eq!(
            names(&source, "san").await,
            vec!["San Antonio", "San Diego", "San Jose"]
        );
    }

    #[tokio::test]
    async fn test_country_matches_sorted_by_population() {
        let source = StaticCitySource::new();
        let found = names(&source, "united arab").await;
        assert_eq!(found, vec!["Dubai", "Abu Dhabi"]);

        let found = source.fetch("united states", 10).await.unwrap();
        assert_eq!(found.len(), 10);
        assert_eq!(found[0].name, "New York");
        assert!(found.windows(2).all(|w| w[0].population >= w[1].population));
    }

    #[tokio::test]
    async fn test_region_match() {
        let source = StaticCitySource::new();
        assert_eq!(
            names(&source, "texas").await,
            vec!["Houston", "San Antonio", "Dallas", "Austin", "Fort Worth", "El Paso"]
        );
    }

    #[test]
    fn test_builtin_table_size() {
        assert_eq!(builtin_cities().len(), 40);
    }

    #[test]
    fn test_lookup_query_targets_lookup_columns() {
        use crate::adapter::DatabaseBuilder;
        use crate::backend::remote::postgrest_plan;

        let db = DatabaseBuilder::build_local().unwrap();
        let query = DatabaseCitySource::new(db).lookup_query("Man(", 500);
        let plan = postgrest_plan(query.request());

        assert_eq!(plan.path, "/cities_lookup");
        let params: Vec<(&str, &str)> = plan
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            params,
            vec![
                ("select", CITY_LOOKUP_COLUMNS),
                (
                    "or",
                    "(city_name.ilike.*Man*,country_name.ilike.*Man*,state_province.ilike.*Man*)"
                ),
                ("order", "population.desc"),
                ("limit", "50"),
            ]
        );
        assert!(CITY_LOOKUP_COLUMNS.contains("name:city_name"));
        assert!(CITY_LOOKUP_COLUMNS.contains("country:country_name"));
    }

    #[test]
    fn test_lookup_rows_decode_and_rank() {
        let rows = Envelope::ok(serde_json::json!([
            {"id": 7, "name": "Al Manamah Suburb", "country": "Bahrain", "country_code": "BH",
             "state_province": null, "population": null, "is_capital": false,
             "latitude": 26.2, "longitude": 50.5},
            {"id": 1, "name": "Manama", "country": "Bahrain", "country_code": "BH",
             "state_province": "Capital", "population": 157474, "is_capital": true,
             "latitude": 26.2285, "longitude": 50.586}
        ]));
        let cities = rows.decode::<Option<Vec<City>>>().unwrap().unwrap_or_default();
        let ranked = rank_cities(cities, "manama", 10);

        assert_eq!(ranked[0].name, "Manama");
        assert_eq!(ranked[0].id, "1");
        assert_eq!(ranked[1].population, 0);
        assert_eq!(ranked[1].state_province, "");

        let empty = Envelope::ok(serde_json::Value::Null);
        assert_eq!(empty.decode::<Option<Vec<City>>>().unwrap(), None);
    }

    #[tokio::test]
    async fn test_cache_capacity_bounds_distinct_queries() {
        let service = CitySearchService::new(
            Arc::new(StaticCitySource::new()),
            chrono::Duration::seconds(300),
        )
        .with_cache_capacity(2);

        for query in ["lon", "par", "dub", "tok"] {
            service.search(query).await;
        }
        let stats = service.cache_stats().await;
        assert_eq!(stats.size, 2);
    }

    #[test]
    fn test_sanitize_term() {
        assert_eq!(sanitize_term("a,b(c)*%"), "abc");
    }
}
