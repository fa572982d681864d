//! Connection settings for distributed cache backends.

use crate::error::{CacheError, CacheResult};
use std::time::Duration;

/// Cache backend configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Connection URL
    pub url: String,

    /// Namespace prepended to every key (`prefix:key`)
    pub key_prefix: Option<String>,

    /// TTL used when a write does not specify one
    pub default_ttl: Option<Duration>,

    /// Connection timeout
    pub connection_timeout: Duration,
}

impl CacheConfig {
    /// Create a Redis configuration.
    ///
    /// ```
    /// use waff_cache::CacheConfig;
    ///
    /// let config = CacheConfig::redis("redis://localhost:6379").unwrap();
    /// assert_eq!(config.build_key("flag"), "flag");
    /// ```
    pub fn redis(url: impl Into<String>) -> CacheResult<Self> {
        let url = url.into();
        if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
            return Err(CacheError::Config(format!("not a redis url: {}", url)));
        }
        Ok(Self {
            url,
            key_prefix: None,
            default_ttl: None,
            connection_timeout: Duration::from_secs(5),
        })
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Build the final key with the prefix applied.
    pub fn build_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_config() {
        let config = CacheConfig::redis("redis://localhost:6379").unwrap();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_foreign_scheme() {
        assert!(matches!(
            CacheConfig::redis("memcache://localhost:11211"),
            Err(CacheError::Config(_))
        ));
    }

    #[test]
    fn test_build_key_with_prefix() {
        let config = CacheConfig::redis("redis://localhost:6379")
            .unwrap()
            .with_key_prefix("shop")
            .with_default_ttl(Duration::from_secs(300));

        assert_eq!(config.build_key("waffle:abc"), "shop:waffle:abc");
        assert_eq!(config.default_ttl, Some(Duration::from_secs(300)));
    }
}
