use anyhow::Result;
use async_trait::async_trait;

/// A named bucket of raw key/value pairs.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Returns whether the key was present.
    async fn remove(&self, key: &[u8]) -> Result<bool>;

    async fn values(&self) -> Result<Vec<Vec<u8>>>;
}
