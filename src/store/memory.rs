//! In-process expiring map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, error, instrument};

use crate::store::{EntryOptions, KeyValueStore, StoreError};

/// Writes between full sweeps of expired entries.
const SWEEP_INTERVAL: usize = 64;

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
    sliding: Option<Duration>,
    last_access: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        let past_deadline = self.expires_at.is_some_and(|deadline| now >= deadline);
        let idle_too_long = self
            .sliding
            .is_some_and(|window| now.saturating_duration_since(self.last_access) >= window);
        past_deadline || idle_too_long
    }
}

/// Expiring map guarded by a mutex.
///
/// Expiration is lazy: a stale entry is dropped when read, and the whole map
/// is swept once every 64 writes. There is no background task. Time comes
/// from tokio's clock, so a paused test runtime controls expiry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        debug!("Creating in-memory store");
        Self::default()
    }

    /// Number of live entries.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        let mut entries = self.lock()?;
        sweep(&mut entries, Instant::now());
        Ok(entries.len())
    }

    /// Returns true if no live entries remain.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, StoreError> {
        self.entries.lock().map_err(|e| {
            error!(error = %e, "Memory store lock poisoned");
            StoreError::backend(format!("Memory store lock poisoned: {}", e))
        })
    }
}

fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    let evicted = before - entries.len();
    if evicted > 0 {
        debug!(evicted, "Evicted expired entries");
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let mut entries = self.lock()?;

        match entries.get_mut(key) {
            None => Ok(None),
            Some(entry) if !entry.is_expired(now) => {
                entry.last_access = now;
                Ok(Some(entry.value.clone()))
            }
            Some(_) => {
                debug!(key, "Entry expired");
                entries.remove(key);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: Vec<u8>, options: EntryOptions) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        if self.writes.fetch_add(1, Ordering::Relaxed).is_multiple_of(SWEEP_INTERVAL) {
            sweep(&mut entries, now);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: options.absolute.map(|ttl| now + ttl),
                sliding: options.sliding,
                last_access: now,
            },
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(absolute: u64) -> EntryOptions {
        EntryOptions {
            absolute: Some(Duration::from_secs(absolute)),
            sliding: None,
        }
    }

    fn stored(store: &MemoryStore) -> usize {
        store.lock().expect("Lock poisoned").len()
    }

    #[tokio::test(start_paused = true)]
    async fn writes_sweep_only_on_interval() {
        let store = MemoryStore::new();
        store.set("stale", b"1".to_vec(), options(1)).await.expect("Set failed");
        tokio::time::advance(Duration::from_secs(2)).await;

        for i in 1..SWEEP_INTERVAL {
            store
                .set(&format!("key{}", i), b"1".to_vec(), options(600))
                .await
                .expect("Set failed");
        }
        assert_eq!(stored(&store), SWEEP_INTERVAL);

        store.set("last", b"1".to_vec(), options(600)).await.expect("Set failed");
        assert_eq!(stored(&store), SWEEP_INTERVAL);
        assert!(!store.lock().expect("Lock poisoned").contains_key("stale"));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_dropped_on_read() {
        let store = MemoryStore::new();
        store.set("first", b"1".to_vec(), options(600)).await.expect("Set failed");
        store.set("short", b"2".to_vec(), options(1)).await.expect("Set failed");
        tokio::time::advance(Duration::from_secs(2)).await;

        store.set("other", b"3".to_vec(), options(600)).await.expect("Set failed");
        assert_eq!(stored(&store), 3);

        assert_eq!(store.get("short").await.expect("Get failed"), None);
        assert_eq!(stored(&store), 2);
        assert_eq!(store.len().expect("Lock poisoned"), 2);
    }
}
