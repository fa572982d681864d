//! Typed wrappers over the JSON cache interface.

use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::time::Duration;
use waff_log::warn;

/// Get a typed value from the cache.
pub async fn get<S, T>(store: &S, key: &str) -> CacheResult<Option<T>>
where
    S: CacheStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get_json(key).await? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| CacheError::Deserialization(e.to_string())),
        None => Ok(None),
    }
}

/// Set a typed value in the cache.
pub async fn set<S, T>(store: &S, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()>
where
    S: CacheStore + ?Sized,
    T: Serialize + ?Sized,
{
    let json = to_json(value)?;
    store.set_json(key, json, ttl).await
}

/// Store a typed value only if the key is absent.
pub async fn add<S, T>(store: &S, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<bool>
where
    S: CacheStore + ?Sized,
    T: Serialize + ?Sized,
{
    let json = to_json(value)?;
    store.add_json(key, json, ttl).await
}

/// Get a typed value, evicting an entry that no longer decodes.
///
/// A stale entry (for example one written before a record gained a field)
/// reads as a miss so the caller reloads and re-adds it.
pub async fn get_or_evict<S, T>(store: &S, key: &str) -> CacheResult<Option<T>>
where
    S: CacheStore + ?Sized,
    T: DeserializeOwned,
{
    match get(store, key).await {
        Err(CacheError::Deserialization(reason)) => {
            warn!("evicting undecodable cache entry {}: {}", key, reason);
            store.delete(key).await?;
            Ok(None)
        }
        other => other,
    }
}

/// Return the cached value, or build it with `factory` and add it.
///
/// The factory's error type only needs to absorb [`CacheError`], so callers
/// can load from their own backends inside it.
pub async fn remember<S, T, E, F, Fut>(
    store: &S,
    key: &str,
    ttl: Option<Duration>,
    factory: F,
) -> Result<T, E>
where
    S: CacheStore + ?Sized,
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(value) = get_or_evict(store, key).await? {
        return Ok(value);
    }

    let value = factory().await?;
    add(store, key, &value, ttl).await?;
    Ok(value)
}

/// Like [`remember`], but a factory result of `None` is not cached.
pub async fn remember_found<S, T, E, F, Fut>(
    store: &S,
    key: &str,
    ttl: Option<Duration>,
    factory: F,
) -> Result<Option<T>, E>
where
    S: CacheStore + ?Sized,
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    if let Some(value) = get_or_evict(store, key).await? {
        return Ok(Some(value));
    }

    let value = factory().await?;
    if let Some(ref found) = value {
        add(store, key, found, ttl).await?;
    }
    Ok(value)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CacheResult<String> {
    serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCache;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        active: bool,
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let cache = InMemoryCache::new();
        let record = Record {
            name: "foo".into(),
            active: true,
        };
        set(&cache, "r", &record, None).await.unwrap();

        let loaded: Option<Record> = get(&cache, "r").await.unwrap();
        assert_eq!(loaded, Some(record));
    }

    #[tokio::test]
    async fn test_get_reports_bad_json() {
        let cache = InMemoryCache::new();
        cache.set_json("r", "not json".to_string(), None).await.unwrap();

        let result: CacheResult<Option<Record>> = get(&cache, "r").await;
        assert!(matches!(result, Err(CacheError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_remember_calls_factory_once() {
        let cache = InMemoryCache::new();
        let first: Vec<u64> = remember(&cache, "ids", None, || async {
            Ok::<_, CacheError>(vec![1, 2])
        })
        .await
        .unwrap();
        let second: Vec<u64> = remember(&cache, "ids", None, || async {
            Err(CacheError::Other("factory ran on a hit".to_string()))
        })
        .await
        .unwrap();

        assert_eq!(first, vec![1, 2]);
        assert_eq!(second, vec![1, 2]);
    }

    #[derive(Debug, PartialEq)]
    enum LoadError {
        Cache,
        Backend,
    }

    impl From<CacheError> for LoadError {
        fn from(_: CacheError) -> Self {
            LoadError::Cache
        }
    }

    #[tokio::test]
    async fn test_remember_passes_factory_errors_through() {
        let cache = InMemoryCache::new();
        let result: Result<Vec<u64>, LoadError> =
            remember(&cache, "ids", None, || async { Err(LoadError::Backend) }).await;

        assert_eq!(result, Err(LoadError::Backend));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_remember_found_skips_absent_values() {
        let cache = InMemoryCache::new();
        let missing: Option<Record> =
            remember_found(&cache, "r", None, || async { Ok::<_, CacheError>(None) })
                .await
                .unwrap();
        assert!(missing.is_none());
        assert!(!cache.exists("r").await.unwrap());

        let found: Option<Record> = remember_found(&cache, "r", None, || async {
            Ok::<_, CacheError>(Some(Record {
                name: "foo".into(),
                active: true,
            }))
        })
        .await
        .unwrap();
        assert!(found.is_some());
        assert!(cache.exists("r").await.unwrap());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_reloaded() {
        let cache = InMemoryCache::new();
        cache.set_json("r", "{\"legacy\":1}".to_string(), None).await.unwrap();

        let evicted: Option<Record> = get_or_evict(&cache, "r").await.unwrap();
        assert!(evicted.is_none());
        assert!(!cache.exists("r").await.unwrap());

        cache.set_json("r", "not json".to_string(), None).await.unwrap();
        let record: Record = remember(&cache, "r", None, || async {
            Ok::<_, CacheError>(Record {
                name: "fresh".into(),
                active: false,
            })
        })
        .await
        .unwrap();
        assert_eq!(record.name, "fresh");

        let cached: Option<Record> = get(&cache, "r").await.unwrap();
        assert_eq!(cached, Some(record));
    }
}
