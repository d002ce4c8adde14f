//! Byte-level key-value backend abstraction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::store::{EntryOptions, StoreError};

/// An expiring key-value store holding opaque byte values.
///
/// Keys arrive already normalized. Implementations must be safe to use
/// concurrently on distinct keys; writes to the same key are last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, renewing its sliding expiration.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`, replacing any existing entry.
    async fn set(&self, key: &str, value: Vec<u8>, options: EntryOptions) -> Result<(), StoreError>;

    /// Removes the entry under `key` if present.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, options: EntryOptions) -> Result<(), StoreError> {
        (**self).set(key, value, options).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key).await
    }
}
