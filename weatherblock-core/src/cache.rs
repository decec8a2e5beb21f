use crate::model::WeatherSnapshot;
use crate::transient::TransientStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Key namespace for cached snapshots.
const KEY_PREFIX: &str = "weather_";

/// Cache-aside layer for weather snapshots.
///
/// A pure optimization: every caller must behave correctly if the store is
/// emptied between any two calls.
pub struct SnapshotCache {
    store: Arc<dyn TransientStore>,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn TransientStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Cached snapshot for a normalized city key, if present and unexpired.
    pub async fn get(&self, city_key: &str) -> Option<WeatherSnapshot> {
        let key = Self::key_for(city_key);
        let raw = self.store.get(&key).await?;

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                // An entry written under an older schema reads as a miss
                // and gets overwritten by the next successful fetch.
                debug!(city = city_key, error = %err, "dropping undecodable cache entry");
                self.store.remove(&key).await;
                None
            }
        }
    }

    /// Stores a snapshot under the city key with a fresh TTL, replacing any
    /// prior entry.
    pub async fn put(&self, city_key: &str, snapshot: &WeatherSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(raw) => self.store.set(&Self::key_for(city_key), raw, self.ttl).await,
            Err(err) => debug!(city = city_key, error = %err, "failed to encode snapshot"),
        }
    }

    /// Drops every cached snapshot. Called when the provider credential
    /// changes, since old entries were fetched under a key that may no
    /// longer be valid.
    pub async fn invalidate_all(&self) {
        self.store.remove_prefix(KEY_PREFIX).await;
    }

    fn key_for(city_key: &str) -> String {
        format!("{KEY_PREFIX}{city_key}")
    }
}
