//! Random digit sources for secret combinations.

mod error;
mod local;
mod random_org;

pub use error::UpstreamError;
pub use local::LocalSource;
pub use random_org::RandomOrgSource;

use std::sync::Arc;

use async_trait::async_trait;
use mastermind_rules::DigitRange;
use tokio_util::sync::CancellationToken;

/// Produces ordered random digits for a new secret.
///
/// Implementations never fail from the caller's point of view: for a
/// non-empty `range` they return exactly `count` digits inside it. An
/// inverted range holds no digits, and the result is then empty.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Returns `count` digits, each within `range`.
    async fn generate(&self, count: usize, range: DigitRange, cancel: &CancellationToken) -> Vec<i32>;
}

#[async_trait]
impl<T: SecretSource + ?Sized> SecretSource for Arc<T> {
    async fn generate(&self, count: usize, range: DigitRange, cancel: &CancellationToken) -> Vec<i32> {
        (**self).generate(count, range, cancel).await
    }
}
