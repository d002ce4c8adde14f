//! Local uniform generator.

use async_trait::async_trait;
use mastermind_rules::DigitRange;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

use crate::random::SecretSource;

/// Uniform digits from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSource;

impl LocalSource {
    /// Draws `count` digits uniformly from `range`, inclusive on both ends.
    ///
    /// An inverted range holds no digits, so nothing is drawn and the result is empty.
    #[instrument(skip(self))]
    pub fn draw(&self, count: usize, range: DigitRange) -> Vec<i32> {
        if range.min() > range.max() {
            error!(min = range.min(), max = range.max(), "Inverted digit range; drawing nothing");
            return Vec::new();
        }

        let mut rng = rand::thread_rng();
        let digits: Vec<i32> = (0..count).map(|_| rng.gen_range(range.min()..=range.max())).collect();
        debug!(count, "Generated digits locally");
        digits
    }
}

#[async_trait]
impl SecretSource for LocalSource {
    async fn generate(&self, count: usize, range: DigitRange, _cancel: &CancellationToken) -> Vec<i32> {
        self.draw(count, range)
    }
}
