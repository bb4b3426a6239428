use async_trait::async_trait;
use crate::Result;

/// Durable string key-value persistence for settings and the user record.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
