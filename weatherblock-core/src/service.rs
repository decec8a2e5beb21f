use crate::cache::SnapshotCache;
use crate::config::Config;
use crate::error::WeatherError;
use crate::model::{WeatherSnapshot, normalize_city};
use crate::provider::{CurrentWeather, client_from_config};
use crate::rate::{RateDecision, RateLimiter};
use crate::transient::{MemoryTransients, TransientStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Cache-aside, rate-limited weather fetch service.
///
/// The single capability behind every adapter surface (HTTP, CLI): adapters
/// translate transport concerns and call [`WeatherService::fetch_weather`],
/// never reimplementing fetch, cache or limit policy themselves.
pub struct WeatherService {
    /// Swapped wholesale when the credential changes; `None` until a key is
    /// configured.
    client: RwLock<Option<Arc<dyn CurrentWeather>>>,
    cache: SnapshotCache,
    limiter: RateLimiter,
}

impl WeatherService {
    pub fn new(
        client: Option<Arc<dyn CurrentWeather>>,
        store: Arc<dyn TransientStore>,
        cache_ttl: Duration,
        rate_limit: u32,
        rate_window: Duration,
    ) -> Self {
        Self {
            client: RwLock::new(client),
            cache: SnapshotCache::new(store, cache_ttl),
            limiter: RateLimiter::new(rate_limit, rate_window),
        }
    }

    /// Builds the service from configuration with the in-process store.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let client: Option<Arc<dyn CurrentWeather>> = match config.api_key() {
            Some(_) => Some(Arc::new(client_from_config(config)?)),
            None => None,
        };

        Ok(Self::new(
            client,
            Arc::new(MemoryTransients::new()),
            config.cache_ttl(),
            config.rate_limit,
            config.rate_window(),
        ))
    }

    /// Fetch current weather for `city` on behalf of `client_key`.
    ///
    /// Read path: cache first (hits bypass the limiter entirely), then the
    /// limiter, then the provider. A successful fetch is cached; a failed
    /// one never is, so the next request retries the provider.
    pub async fn fetch_weather(
        &self,
        city: &str,
        client_key: &str,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let city_key = normalize_city(city);
        if city_key.is_empty() {
            return Err(WeatherError::InvalidInput("city must not be empty".to_string()));
        }

        if let Some(snapshot) = self.cache.get(&city_key).await {
            debug!(city = %city_key, "cache hit");
            return Ok(snapshot);
        }

        if let RateDecision::Limited { retry_after } = self.limiter.check(client_key) {
            warn!(
                city = %city_key,
                retry_after_secs = retry_after.as_secs(),
                "request rate limited"
            );
            return Err(WeatherError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }

        let client = self
            .client
            .read()
            .await
            .clone()
            .ok_or(WeatherError::MissingCredential)?;

        debug!(city = %city_key, "cache miss, querying provider");
        let snapshot = client.current_weather(&city_key).await?;

        self.cache.put(&city_key, &snapshot).await;
        info!(city = %snapshot.city, "fetched weather snapshot");
        Ok(snapshot)
    }

    /// Swap the provider credential and purge cached snapshots, which were
    /// fetched under the previous key.
    pub async fn set_credential(&self, config: &Config) -> Result<(), WeatherError> {
        let client: Option<Arc<dyn CurrentWeather>> = match config.api_key() {
            Some(_) => Some(Arc::new(client_from_config(config)?)),
            None => None,
        };

        *self.client.write().await = client;
        self.cache.invalidate_all().await;
        info!(configured = config.has_api_key(), "credential updated, cache purged");
        Ok(())
    }

    pub async fn has_credential(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Drop every cached snapshot without touching the credential.
    pub async fn invalidate_cache(&self) {
        self.cache.invalidate_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::OpenWeatherClient;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::time::advance;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TTL: Duration = Duration::from_secs(900);
    const WINDOW: Duration = Duration::from_secs(3600);

    fn sample(city: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            city: city.to_string(),
            temperature_f: 70.0,
            description: "clear sky".to_string(),
            humidity_pct: 40,
            wind_speed_mph: 5.0,
            icon_code: "01d".to_string(),
            icon_url: "https://openweathermap.org/img/wn/01d@2x.png".to_string(),
            observed_at: Utc::now(),
        }
    }

    /// Test double that counts provider calls and fails on demand.
    #[derive(Debug, Default)]
    struct FakeClient {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl CurrentWeather for FakeClient {
        async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(WeatherError::MalformedResponse("scripted failure".to_string()));
            }
            Ok(sample(city))
        }
    }

    fn service_with(
        client: Arc<FakeClient>,
        store: Arc<MemoryTransients>,
        rate_limit: u32,
    ) -> WeatherService {
        WeatherService::new(Some(client), store, TTL, rate_limit, WINDOW)
    }

    #[tokio::test]
    async fn second_fetch_within_ttl_is_served_from_cache() {
        let client = Arc::new(FakeClient::default());
        let service = service_with(Arc::clone(&client), Arc::new(MemoryTransients::new()), 30);

        let first = service.fetch_weather("London", "c1").await.unwrap();
        let second = service.fetch_weather("London", "c1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn differently_cased_queries_share_one_entry() {
        let client = Arc::new(FakeClient::default());
        let service = service_with(Arc::clone(&client), Arc::new(MemoryTransients::new()), 30);

        service.fetch_weather("London", "c1").await.unwrap();
        service.fetch_weather("  LONDON ", "c1").await.unwrap();

        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_triggers_a_new_provider_call() {
        let client = Arc::new(FakeClient::default());
        let service = service_with(Arc::clone(&client), Arc::new(MemoryTransients::new()), 30);

        service.fetch_weather("London", "c1").await.unwrap();
        advance(TTL + Duration::from_secs(1)).await;
        service.fetch_weather("London", "c1").await.unwrap();

        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_never_cached() {
        let client = Arc::new(FakeClient::default());
        let store = Arc::new(MemoryTransients::new());
        let service = service_with(Arc::clone(&client), Arc::clone(&store), 30);

        client.fail.store(true, Ordering::SeqCst);
        assert!(service.fetch_weather("London", "c1").await.is_err());
        assert_eq!(store.get("weather_london").await, None);

        // The very next request goes back to the provider, not the cache.
        assert!(service.fetch_weather("London", "c1").await.is_err());
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);

        client.fail.store(false, Ordering::SeqCst);
        assert!(service.fetch_weather("London", "c1").await.is_ok());
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn limiter_threshold_applies_per_client() {
        let client = Arc::new(FakeClient::default());
        let service = service_with(Arc::clone(&client), Arc::new(MemoryTransients::new()), 3);

        // Distinct cities so every call misses the cache.
        for city in ["a", "b", "c"] {
            assert!(service.fetch_weather(city, "c1").await.is_ok());
        }

        let err = service.fetch_weather("d", "c1").await.unwrap_err();
        assert!(matches!(err, WeatherError::RateLimited { .. }));
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);

        advance(WINDOW + Duration::from_secs(1)).await;
        assert!(service.fetch_weather("e", "c1").await.is_ok());
    }

    #[tokio::test]
    async fn cache_hits_bypass_the_limiter() {
        let client = Arc::new(FakeClient::default());
        let service = service_with(Arc::clone(&client), Arc::new(MemoryTransients::new()), 1);

        // Uses the single permit in the window.
        service.fetch_weather("London", "c1").await.unwrap();

        // Hits are free for any client, limited or not.
        for _ in 0..5 {
            assert!(service.fetch_weather("London", "c1").await.is_ok());
            assert!(service.fetch_weather("London", "c2").await.is_ok());
        }

        // A miss for the same exhausted client is still rejected.
        let err = service.fetch_weather("Paris", "c1").await.unwrap_err();
        assert!(matches!(err, WeatherError::RateLimited { .. }));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_city_is_invalid_input_with_no_provider_call() {
        let client = Arc::new(FakeClient::default());
        let service = service_with(Arc::clone(&client), Arc::new(MemoryTransients::new()), 30);

        for city in ["", "   "] {
            let err = service.fetch_weather(city, "c1").await.unwrap_err();
            assert!(matches!(err, WeatherError::InvalidInput(_)));
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_credential_fails_fast_without_cache_write() {
        let store = Arc::new(MemoryTransients::new());
        let store_concrete = Arc::clone(&store);
        let store_dyn: Arc<dyn TransientStore> = store_concrete;
        let service = WeatherService::new(None, store_dyn, TTL, 30, WINDOW);

        let err = service.fetch_weather("London", "c1").await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingCredential));
        assert!(!service.has_credential().await);
        assert_eq!(store.get("weather_london").await, None);
    }

    #[tokio::test]
    async fn set_credential_purges_cached_snapshots() {
        let client = Arc::new(FakeClient::default());
        let store = Arc::new(MemoryTransients::new());
        let service = service_with(Arc::clone(&client), Arc::clone(&store), 30);

        service.fetch_weather("London", "c1").await.unwrap();
        assert!(store.get("weather_london").await.is_some());

        let mut config = Config::default();
        config.set_api_key("ROTATED".to_string());
        service.set_credential(&config).await.unwrap();

        assert!(service.has_credential().await);
        assert_eq!(store.get("weather_london").await, None);
    }

    #[tokio::test]
    async fn clearing_the_credential_disables_fetches() {
        let client = Arc::new(FakeClient::default());
        let service = service_with(Arc::clone(&client), Arc::new(MemoryTransients::new()), 30);

        service.set_credential(&Config::default()).await.unwrap();

        let err = service.fetch_weather("London", "c1").await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingCredential));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn end_to_end_london_round_trip() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "london"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "London",
                "dt": 1717000000,
                "main": { "temp": 68.2, "humidity": 74 },
                "wind": { "speed": 9.4 },
                "weather": [ { "description": "light rain", "icon": "10d" } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenWeatherClient::new(
            "KEY".to_string(),
            server.uri(),
            "https://openweathermap.org".to_string(),
        )
        .unwrap();

        let service = WeatherService::new(
            Some(Arc::new(client)),
            Arc::new(MemoryTransients::new()),
            TTL,
            30,
            WINDOW,
        );

        let first = service.fetch_weather("London", "c1").await.unwrap();
        assert_eq!(first.city, "London");
        assert_eq!(first.icon_url, "https://openweathermap.org/img/wn/10d@2x.png");

        // Second call within the TTL: identical snapshot, zero network calls
        // (the mock's expectation of exactly one request verifies on drop).
        let second = service.fetch_weather("London", "c2").await.unwrap();
        assert_eq!(first, second);
    }
}
