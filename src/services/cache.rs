use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// In-memory cache for dashboard aggregates
///
/// Values are stored serialized so any response type can share one cache. Entries
/// expire after the configured TTL and are dropped early when a stat changes.
///
/// Aggregate keys carry the stats generation. A reader takes the generation before
/// loading, so a value computed before an invalidation lands under a key that is
/// never read again.
pub struct StatsCache {
    inner: moka::future::Cache<String, Vec<u8>>,
    generation: AtomicU64,
}

impl StatsCache {
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let inner = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            inner,
            generation: AtomicU64::new(0),
        }
    }

    /// Generation to build aggregate keys with; changes whenever a stat changes
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Drop every cached aggregate after a stat change
    pub async fn invalidate_stats(&self) {
        let previous = self.generation.fetch_add(1, Ordering::AcqRel);
        self.delete(&CacheKey::breed_data(previous)).await;
    }

    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.inner.get(key).await {
            Some(bytes) => {
                tracing::trace!("Cache hit: {}", key);
                Ok(serde_json::from_slice(&bytes)?)
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Err(CacheError::CacheMiss(key.to_string()))
            }
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;
        self.inner.insert(key.to_string(), bytes).await;
        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    pub async fn delete(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Totals per breed and per breed group
    pub fn breed_data(generation: u64) -> String {
        format!("stats:breed_data:{}", generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_set_get_delete() {
        let cache = StatsCache::new(16, 60);
        let key = CacheKey::breed_data(0);

        cache.set(&key, &vec![1, 2, 3]).await.unwrap();
        let value: Vec<i32> = cache.get(&key).await.unwrap();
        assert_eq!(value, vec![1, 2, 3]);

        cache.delete(&key).await;
        assert!(matches!(
            cache.get::<Vec<i32>>(&key).await,
            Err(CacheError::CacheMiss(_))
        ));
    }

    #[tokio::test]
    async fn test_load_racing_invalidation_is_not_served() {
        let cache = StatsCache::new(16, 60);

        // Reader takes the generation and loads totals
        let seen = cache.generation();
        // A stat changes before the reader stores its result
        cache.invalidate_stats().await;
        cache.set(&CacheKey::breed_data(seen), &vec![0]).await.unwrap();

        let current = cache.generation();
        assert_ne!(current, seen);
        assert!(matches!(
            cache.get::<Vec<i32>>(&CacheKey::breed_data(current)).await,
            Err(CacheError::CacheMiss(_))
        ));
    }

    #[tokio::test]
    async fn test_invalidate_drops_current_entry() {
        let cache = StatsCache::new(16, 60);
        let key = CacheKey::breed_data(cache.generation());
        cache.set(&key, &vec![1]).await.unwrap();

        cache.invalidate_stats().await;
        assert!(cache.get::<Vec<i32>>(&key).await.is_err());
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::breed_data(3), "stats:breed_data:3");
    }
}
