//! Typed session store over a byte-level backend.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use crate::store::{KeyValueStore, StoreError, StoreErrorKind, StoreKey, Ttl, TtlDefaults};

/// Expiring, JSON-backed key-value store.
///
/// Normalizes keys, resolves TTLs against the configured defaults and
/// serializes values with `serde_json`. Every backend failure is logged and
/// returned; nothing is swallowed. Each operation races the caller's
/// cancellation token, and an already-cancelled token stops the operation
/// before it reaches the backend.
#[derive(Debug, Clone)]
pub struct SessionStore<B> {
    backend: B,
    defaults: TtlDefaults,
    enable_diagnostics: bool,
}

impl<B: KeyValueStore> SessionStore<B> {
    /// Wraps `backend` with the given TTL defaults.
    pub fn new(backend: B, defaults: TtlDefaults) -> Self {
        Self {
            backend,
            defaults,
            enable_diagnostics: false,
        }
    }

    /// Turns debug events for misses and writes on or off.
    pub fn with_diagnostics(mut self, enable: bool) -> Self {
        self.enable_diagnostics = enable;
        self
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the TTL defaults.
    pub fn defaults(&self) -> TtlDefaults {
        self.defaults
    }

    /// Loads and decodes the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] for an invalid key, a backend failure, a
    /// value that does not decode as `T`, or cancellation.
    #[instrument(skip(self, key, cancel))]
    pub async fn get<T>(&self, key: impl Into<StoreKey>, cancel: &CancellationToken) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let key = key.into().normalize()?;
        self.get_normalized(&key, cancel).await
    }

    /// Encodes `value` and stores it under `key`, replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] for an invalid key, an encoding failure, a
    /// backend failure, or cancellation.
    #[instrument(skip(self, key, value, cancel))]
    pub async fn set<T>(
        &self,
        key: impl Into<StoreKey>,
        value: &T,
        ttl: Ttl,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let key = key.into().normalize()?;
        self.set_normalized(&key, value, ttl, cancel).await
    }

    /// Removes the entry under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] for an invalid key, a backend failure, or cancellation.
    #[instrument(skip(self, key, cancel))]
    pub async fn remove(&self, key: impl Into<StoreKey>, cancel: &CancellationToken) -> Result<(), StoreError> {
        let key = key.into().normalize()?;
        guarded("remove", &key, cancel, self.backend.remove(&key)).await
    }

    /// Returns the value under `key`, creating it with `factory` on a miss.
    ///
    /// The factory runs at most once per call and receives a clone of the
    /// cancellation token. A `None` result is returned as-is and never
    /// stored. A factory error is returned unchanged and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns the factory's error, or a store error converted into `E`.
    #[instrument(skip(self, key, factory, cancel))]
    pub async fn get_or_create<T, E, F, Fut>(
        &self,
        key: impl Into<StoreKey>,
        factory: F,
        ttl: Ttl,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<StoreError>,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let key = key.into().normalize()?;

        if let Some(cached) = self.get_normalized(&key, cancel).await? {
            return Ok(Some(cached));
        }

        let created = match factory(cancel.clone()).await {
            Ok(created) => created,
            Err(e) => {
                error!(key = %key, "Store factory failed");
                return Err(e);
            }
        };

        let Some(created) = created else {
            debug!(key = %key, "Factory produced nothing; not storing");
            return Ok(None);
        };

        self.set_normalized(&key, &created, ttl, cancel).await?;
        Ok(Some(created))
    }

    async fn get_normalized<T>(&self, key: &str, cancel: &CancellationToken) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let Some(bytes) = guarded("get", key, cancel, self.backend.get(key)).await? else {
            if self.enable_diagnostics {
                debug!(key, "Store miss");
            }
            return Ok(None);
        };

        if bytes.is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            error!(key, error = %e, "Stored value failed to decode");
            StoreError::from(e)
        })?;
        Ok(Some(value))
    }

    async fn set_normalized<T>(&self, key: &str, value: &T, ttl: Ttl, cancel: &CancellationToken) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let options = ttl.resolve(self.defaults);
        let bytes = serde_json::to_vec(value).map_err(|e| {
            error!(key, error = %e, "Value failed to encode");
            StoreError::from(e)
        })?;

        guarded("set", key, cancel, self.backend.set(key, bytes, options)).await?;

        if self.enable_diagnostics {
            debug!(key, ?options, "Store set");
        }
        Ok(())
    }
}

/// Runs a backend call unless `cancel` fires first, logging any failure.
async fn guarded<T, F>(operation: &'static str, key: &str, cancel: &CancellationToken, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::cancelled(format!("Store {} cancelled", operation))),
        result = call => result,
    };

    result.map_err(|e| {
        if e.kind == StoreErrorKind::Cancelled {
            warn!(operation, key, "Store operation cancelled");
        } else {
            error!(operation, key, error = %e, "Store operation failed");
        }
        e
    })
}
