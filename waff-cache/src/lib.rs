//! Cache layer for waff.
//!
//! Flag, switch and sample records are looked up read-through: the cache
//! first, the store on a miss. This crate provides the [`CacheStore`] seam,
//! a process-local [`InMemoryCache`], typed helpers, and an optional Redis
//! backend.
//!
//! # Features
//!
//! - `redis` - Enable the [`RedisCache`] backend
//!
//! # Example
//!
//! ```
//! use waff_cache::*;
//!
//! # async fn example() -> CacheResult<()> {
//! let cache = InMemoryCache::new();
//! add(&cache, "waffle:flag", &vec![1u64, 2, 3], None).await?;
//! let ids: Option<Vec<u64>> = get(&cache, "waffle:flag").await?;
//! assert_eq!(ids, Some(vec![1, 2, 3]));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod helpers;
pub mod memory;
pub mod traits;

#[cfg(feature = "redis")]
pub mod redis_cache;

pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use helpers::*;
pub use memory::InMemoryCache;
pub use traits::CacheStore;

#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::CacheConfig;
    pub use crate::error::{CacheError, CacheResult};
    pub use crate::memory::InMemoryCache;
    pub use crate::traits::CacheStore;

    #[cfg(feature = "redis")]
    pub use crate::redis_cache::RedisCache;
}
