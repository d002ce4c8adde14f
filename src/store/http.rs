//! Networked key-value store reached over HTTP.
//!
//! Wire contract, relative to the configured base URL:
//!
//! - `GET <base>/<key>`: 200 with the stored bytes, 404 when absent.
//! - `PUT <base>/<key>?absolute_ttl_ms=..&sliding_ttl_ms=..`: body is the
//!   value; each TTL parameter is omitted when that expiration is off.
//! - `DELETE <base>/<key>`: 2xx or 404.
//!
//! Keys are sent as a single percent-encoded path segment.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, error, info, instrument};

use crate::store::{EntryOptions, KeyValueStore, StoreError};

/// Query parameter carrying the absolute TTL in milliseconds.
pub const ABSOLUTE_TTL_PARAM: &str = "absolute_ttl_ms";

/// Query parameter carrying the sliding TTL in milliseconds.
pub const SLIDING_TTL_PARAM: &str = "sliding_ttl_ms";

/// Client for a remote expiring key-value service.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    /// Creates a client for the store at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the URL cannot be parsed or cannot carry
    /// path segments, or if the HTTP client cannot be built.
    #[instrument(skip(base_url), fields(base_url = %base_url))]
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::backend(format!("Invalid store URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::backend(format!("Store URL '{}' cannot carry a path", base_url)));
        }

        let client = Client::builder().timeout(timeout).build()?;

        info!(url = %base_url, ?timeout, "Created HTTP store client");
        Ok(Self { client, base_url })
    }

    fn entry_url(&self, key: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::backend("Store URL cannot carry a path"))?
            .pop_if_empty()
            .push(key);
        Ok(url)
    }
}

/// Whole milliseconds for a TTL parameter, rounded up so a nonzero TTL never becomes 0.
fn ttl_millis(ttl: Duration) -> u128 {
    ttl.as_nanos().div_ceil(1_000_000).max(1)
}

fn failure(operation: &str, key: &str, status: StatusCode) -> StoreError {
    error!(operation, key, %status, "HTTP store returned failure status");
    StoreError::backend(format!("HTTP store {} for '{}' failed with status {}", operation, key, status))
}

#[async_trait]
impl KeyValueStore for HttpStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let response = self.client.get(self.entry_url(key)?).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!(key, "HTTP store miss");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(failure("get", key, status));
        }

        let bytes = response.bytes().await?;
        debug!(key, bytes = bytes.len(), "HTTP store hit");
        Ok(Some(bytes.to_vec()))
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: Vec<u8>, options: EntryOptions) -> Result<(), StoreError> {
        let mut url = self.entry_url(key)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(ttl) = options.absolute {
                query.append_pair(ABSOLUTE_TTL_PARAM, &ttl_millis(ttl).to_string());
            }
            if let Some(ttl) = options.sliding {
                query.append_pair(SLIDING_TTL_PARAM, &ttl_millis(ttl).to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(value)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure("set", key, status));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let response = self.client.delete(self.entry_url(key)?).send().await?;
        let status = response.status();

        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(failure("remove", key, status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_millisecond_ttl_rounds_up() {
        assert_eq!(ttl_millis(Duration::from_micros(1)), 1);
        assert_eq!(ttl_millis(Duration::from_micros(999)), 1);
        assert_eq!(ttl_millis(Duration::from_micros(1500)), 2);
    }

    #[test]
    fn whole_milliseconds_are_exact() {
        assert_eq!(ttl_millis(Duration::from_millis(1)), 1);
        assert_eq!(ttl_millis(Duration::from_secs(60)), 60_000);
    }
}
