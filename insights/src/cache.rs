//! Get-or-compute cache keyed by string.
//!
//! Values are stored as JSON text so the same entry can be read back by any process
//! sharing the backend. Within one process a per-key async mutex guarantees the producer
//! runs at most once at a time for a key; the entry is re-read after the lock is taken.

use std::{collections::HashMap, future::Future, sync::Arc};

use log::debug;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{Mutex, RwLock};

use crate::errors::ApiError;

/// Per-key locks serializing producers. An entry lives only while someone holds it.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub async fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key.to_string()).or_default().clone()
    }

    /// Hand back a lock from [`KeyLocks::lock_for`], dropping the entry if no one else waits on it.
    pub async fn release(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // one reference in the map, one held here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[allow(async_fn_in_trait)]
pub trait KeyCache {
    async fn read(&self, key: &str) -> Result<Option<String>, ApiError>;

    async fn write(&self, key: &str, value: String) -> Result<(), ApiError>;

    fn key_locks(&self) -> &KeyLocks;

    /// Cached value for `key`, or the producer's result stored under it.
    ///
    /// Producer errors are returned as-is and nothing is cached.
    async fn get_or_compute<T, F, Fut>(&self, key: &str, producer: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(raw) = self.read(key).await? {
            debug!("cache hit for {key}");
            return Ok(serde_json::from_str(&raw)?);
        }

        let lock = self.key_locks().lock_for(key).await;
        let guard = lock.lock().await;

        let result: Result<T, ApiError> = async {
            if let Some(raw) = self.read(key).await? {
                debug!("cache hit for {key} after waiting on producer");
                return Ok(serde_json::from_str(&raw)?);
            }

            debug!("cache miss for {key}");
            let value = producer().await?;
            self.write(key, serde_json::to_string(&value)?).await?;
            Ok(value)
        }
        .await;

        drop(guard);
        self.key_locks().release(key, lock).await;
        result
    }
}

/// Process-local cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
    locks: KeyLocks,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

impl KeyCache for MemoryCache {
    async fn read(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String) -> Result<(), ApiError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    fn key_locks(&self) -> &KeyLocks {
        &self.locks
    }
}

/// Cache entries kept as fields of one Redis hash.
pub struct RedisCache {
    conn: ConnectionManager,
    hash: String,
    locks: KeyLocks,
}

impl RedisCache {
    /// `hash` is the full Redis key, see [`crate::keys::KeyContext::cache_hash`].
    pub fn new(conn: ConnectionManager, hash: impl Into<String>) -> Self {
        Self {
            conn,
            hash: hash.into(),
            locks: KeyLocks::default(),
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl KeyCache for RedisCache {
    async fn read(&self, key: &str) -> Result<Option<String>, ApiError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.hget(&self.hash, key).await?;
        Ok(value)
    }

    async fn write(&self, key: &str, value: String) -> Result<(), ApiError> {
        let mut conn = self.conn.clone();
        let _: () = conn.hset(&self.hash, key, value).await?;
        Ok(())
    }

    fn key_locks(&self) -> &KeyLocks {
        &self.locks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn second_lookup_skips_producer() {
        let cache = MemoryCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..2 {
            let value: Vec<String> = cache
                .get_or_compute("tables_demo", || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec!["orders".to_string()])
                })
                .await
                .unwrap();
            assert_eq!(value, vec!["orders".to_string()]);
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_lookups_run_producer_once() {
        let cache = MemoryCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let lookup = || {
            cache.get_or_compute("shared", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(42u32)
            })
        };

        let (a, b, c) = tokio::join!(lookup(), lookup(), lookup());
        assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (42, 42, 42));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(cache.key_locks().len().await, 0);
    }

    #[tokio::test]
    async fn key_locks_are_dropped_once_idle() {
        let cache = MemoryCache::new();
        for source in ["shop", "crm", "warehouse"] {
            let _: Vec<String> = cache
                .get_or_compute(&format!("get_tables_{source}"), || async { Ok(Vec::new()) })
                .await
                .unwrap();
        }
        let failed: Result<u32, ApiError> = cache
            .get_or_compute("flaky", || async { Err(ApiError::invalid("boom")) })
            .await;
        assert!(failed.is_err());

        assert_eq!(cache.key_locks().len().await, 0);
    }

    #[tokio::test]
    async fn held_lock_survives_release_by_another_holder() {
        let locks = KeyLocks::default();
        let first = locks.lock_for("shop").await;
        let second = locks.lock_for("shop").await;

        locks.release("shop", first).await;
        assert_eq!(locks.len().await, 1);

        locks.release("shop", second).await;
        assert_eq!(locks.len().await, 0);
    }

    #[tokio::test]
    async fn producer_errors_are_not_cached() {
        let cache = MemoryCache::new();
        let failed: Result<u32, ApiError> = cache
            .get_or_compute("flaky", || async { Err(ApiError::invalid("boom")) })
            .await;
        assert!(failed.is_err());
        assert!(!cache.contains("flaky").await);

        let value = cache.get_or_compute("flaky", || async { Ok(7u32) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
