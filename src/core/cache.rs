use async_trait::async_trait;
use std::time::Duration;

/// String-keyed storage with optional per-entry expiry.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>);
    async fn remove(&self, key: &str);
}
