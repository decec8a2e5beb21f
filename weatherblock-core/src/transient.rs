use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Key-value store with per-entry expiry.
///
/// Cached snapshots go through this seam so the backing store can be
/// swapped (in-process map, external store) without touching policy code.
/// Implementations provide atomic get/set per key; callers must not assume
/// anything stronger.
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent or its
    /// TTL has elapsed. The two cases are indistinguishable.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any prior entry and giving the
    /// new one a fresh TTL.
    async fn set(&self, key: &str, value: String, ttl: Duration);

    /// Removes a single entry.
    async fn remove(&self, key: &str);

    /// Removes every entry whose key starts with `prefix`.
    async fn remove_prefix(&self, prefix: &str);
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process [`TransientStore`] backed by a map with lazy expiry.
#[derive(Debug, Default)]
pub struct MemoryTransients {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryTransients {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransientStore for MemoryTransients {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop the entry so the map does not accumulate dead keys.
        // Re-check under the write lock; a concurrent set may have replaced it.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at <= now {
                entries.remove(key);
            }
        }
        None
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let entry = Entry { value, expires_at: Instant::now() + ttl };
        self.entries.write().await.insert(key.to_owned(), entry);
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    async fn remove_prefix(&self, prefix: &str) {
        self.entries.write().await.retain(|key, _| !key.starts_with(prefix));
    }
}
