use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

/// In-memory collection, lost when the process exits.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<String, Entry>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.inner.lock().await;
        if let Some(entry) = entries.get(key) {
            if let Some(expiry) = entry.expires_at
                && expiry < Instant::now()
            {
                debug!("Entry expired for key: {}", key);
                entries.remove(key);
                return None;
            }
            debug!("HIT for key: {}", key);
            return Some(entry.value.clone());
        }
        debug!("MISS for key: {}", key);
        None
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let mut entries = self.inner.lock().await;
        debug!("PUT for key: {}", key);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at,
            },
        );
    }

    async fn remove(&self, key: &str) {
        let mut entries = self.inner.lock().await;
        entries.remove(key);
        debug!("REMOVE for key: {}", key);
    }
}
