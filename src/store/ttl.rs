//! Expiration policy for store entries.

use std::time::Duration;

use tracing::instrument;

/// Expirations requested by a caller for one write.
///
/// For each kind, `None` means "not specified, use the store default",
/// `Some(Duration::ZERO)` disables that kind for this write, and any other
/// value is used as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ttl {
    /// Lifetime measured from the write, regardless of access.
    pub absolute: Option<Duration>,
    /// Lifetime renewed on every access.
    pub sliding: Option<Duration>,
}

impl Ttl {
    /// Creates a request with both kinds specified explicitly or left to defaults.
    pub fn new(absolute: Option<Duration>, sliding: Option<Duration>) -> Self {
        Self { absolute, sliding }
    }

    /// Resolves the request against the store defaults.
    #[instrument]
    pub fn resolve(self, defaults: TtlDefaults) -> EntryOptions {
        EntryOptions {
            absolute: resolve_one(self.absolute, defaults.absolute),
            sliding: resolve_one(self.sliding, defaults.sliding),
        }
    }
}

/// Store-wide defaults; a zero duration means no default for that kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtlDefaults {
    /// Default absolute expiration.
    pub absolute: Duration,
    /// Default sliding expiration.
    pub sliding: Duration,
}

/// Effective expirations handed to a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// Absolute expiration, if any.
    pub absolute: Option<Duration>,
    /// Sliding expiration, if any.
    pub sliding: Option<Duration>,
}

fn resolve_one(requested: Option<Duration>, default: Duration) -> Option<Duration> {
    match requested {
        Some(ttl) if ttl.is_zero() => None,
        Some(ttl) => Some(ttl),
        None if default.is_zero() => None,
        None => Some(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: TtlDefaults = TtlDefaults {
        absolute: Duration::from_secs(60),
        sliding: Duration::from_secs(1800),
    };

    #[test]
    fn explicit_values_win_over_defaults() {
        let ttl = Ttl::new(Some(Duration::from_secs(5)), Some(Duration::from_secs(2)));
        assert_eq!(
            ttl.resolve(DEFAULTS),
            EntryOptions {
                absolute: Some(Duration::from_secs(5)),
                sliding: Some(Duration::from_secs(2)),
            }
        );
    }

    #[test]
    fn explicit_zero_disables_without_default() {
        let ttl = Ttl::new(Some(Duration::ZERO), Some(Duration::ZERO));
        assert_eq!(ttl.resolve(DEFAULTS), EntryOptions::default());
    }

    #[test]
    fn unspecified_falls_back_to_positive_default() {
        assert_eq!(
            Ttl::default().resolve(DEFAULTS),
            EntryOptions {
                absolute: Some(Duration::from_secs(60)),
                sliding: Some(Duration::from_secs(1800)),
            }
        );
    }

    #[test]
    fn zero_default_applies_nothing() {
        let defaults = TtlDefaults {
            absolute: Duration::ZERO,
            sliding: Duration::from_secs(30),
        };
        let resolved = Ttl::new(None, None).resolve(defaults);
        assert_eq!(resolved.absolute, None);
        assert_eq!(resolved.sliding, Some(Duration::from_secs(30)));
    }
}
