//! Cache store trait definition.

use crate::error::CacheResult;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value store holding serialized flag records.
///
/// Values are JSON strings. Implementations must be safe to share between
/// concurrent requests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a JSON value. `Ok(None)` when the key is absent or expired.
    async fn get_json(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a JSON value, replacing any existing one.
    async fn set_json(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()>;

    /// Set a JSON value only if the key is absent.
    ///
    /// Returns `true` when the value was stored. The default implementation
    /// is not atomic; backends with a native add should override it.
    async fn add_json(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<bool> {
        if self.exists(key).await? {
            return Ok(false);
        }
        self.set_json(key, value, ttl).await?;
        Ok(true)
    }

    /// Delete a key.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Remove every key.
    async fn clear(&self) -> CacheResult<()>;

    /// Remaining time-to-live, `None` for persistent or absent keys.
    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>>;

    // ========== Batch Operations ==========

    /// Delete several keys concurrently.
    async fn delete_many(&self, keys: &[&str]) -> CacheResult<()> {
        use futures::future::try_join_all;

        let futures = keys.iter().map(|key| self.delete(key));
        try_join_all(futures).await?;
        Ok(())
    }
}
