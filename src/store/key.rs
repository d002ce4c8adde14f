//! Store key composition and normalization.
//!
//! Normalized keys are lowercase, contain no whitespace or control
//! characters, use single colons as separators and are at most
//! [`MAX_KEY_CHARS`] characters long. Normalizing twice yields the same key.

use tracing::{debug, instrument};

use crate::store::StoreError;

/// Maximum length of a normalized key, in characters.
pub const MAX_KEY_CHARS: usize = 256;

/// A key given either whole or as ordered segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKey {
    /// A complete key string.
    Whole(String),
    /// Fragments such as app, feature and identifier, joined with colons.
    Segments(Vec<String>),
}

impl StoreKey {
    /// Builds a key from segments.
    pub fn segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Segments(segments.into_iter().map(Into::into).collect())
    }

    /// Returns the normalized key.
    ///
    /// # Errors
    ///
    /// Returns an invalid-key error when the key is blank, when no segment
    /// survives normalization, or when the result is empty.
    #[instrument(skip(self))]
    pub fn normalize(&self) -> Result<String, StoreError> {
        let normalized = match self {
            StoreKey::Whole(key) => {
                if key.trim().is_empty() {
                    return Err(StoreError::invalid_key("Key must be provided"));
                }
                normalize_key(key)
            }
            StoreKey::Segments(segments) => {
                if segments.is_empty() {
                    return Err(StoreError::invalid_key("At least one key segment must be provided"));
                }
                build_key(segments)
            }
        };

        if normalized.is_empty() {
            return Err(StoreError::invalid_key("Key is empty after normalization"));
        }

        debug!(key = %normalized, "Key normalized");
        Ok(normalized)
    }
}

impl From<&str> for StoreKey {
    fn from(key: &str) -> Self {
        Self::Whole(key.to_string())
    }
}

impl From<String> for StoreKey {
    fn from(key: String) -> Self {
        Self::Whole(key)
    }
}

impl From<&String> for StoreKey {
    fn from(key: &String) -> Self {
        Self::Whole(key.clone())
    }
}

impl From<Vec<String>> for StoreKey {
    fn from(segments: Vec<String>) -> Self {
        Self::Segments(segments)
    }
}

impl<const N: usize> From<[&str; N]> for StoreKey {
    fn from(segments: [&str; N]) -> Self {
        Self::segments(segments)
    }
}

/// Normalizes a complete key.
///
/// Trims, lowercases, collapses every run of whitespace and colons into one
/// colon, drops control characters and truncates to [`MAX_KEY_CHARS`].
/// Control characters are dropped while scanning, so they never split a
/// separator run into two colons.
pub fn normalize_key(key: &str) -> String {
    let lowered = key.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_separator = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() || ch == ':' {
            if !in_separator {
                out.push(':');
                in_separator = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            out.push(ch);
            in_separator = false;
        }
    }

    out.chars().take(MAX_KEY_CHARS).collect()
}

/// Normalizes a single key segment.
///
/// Trims, lowercases, collapses whitespace runs, drops control characters
/// and turns the remaining spaces into colons.
pub fn normalize_segment(segment: &str) -> String {
    let lowered = segment.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(':');
                in_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }

    out
}

/// Joins normalized segments with colons, skipping blank ones, and
/// normalizes the result as a whole key.
pub fn build_key<S: AsRef<str>>(segments: &[S]) -> String {
    let cleaned: Vec<String> = segments
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.trim().is_empty())
        .map(normalize_segment)
        .filter(|s| !s.is_empty())
        .collect();

    normalize_key(&cleaned.join(":"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize_key("  Game:ABC  "), "game:abc");
    }

    #[test]
    fn collapses_whitespace_and_colon_runs() {
        assert_eq!(normalize_key("a \t: :: b\n\nc"), "a:b:c");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(normalize_key("ab\u{0}c\u{7f}d"), "abcd");
    }

    #[test]
    fn control_character_does_not_split_separator() {
        assert_eq!(normalize_key("a:\u{1}:b"), "a:b");
    }

    #[test]
    fn truncates_long_keys() {
        let key = "x".repeat(MAX_KEY_CHARS + 44);
        assert_eq!(normalize_key(&key).chars().count(), MAX_KEY_CHARS);
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "  Hello   World  ",
            "::a::b::",
            "MiXeD\tCase\r\nKey",
            "a:\u{1}:b",
            "\u{0} lead",
            "ÄÖÜ straße",
            "x y",
            &"long key ".repeat(60),
        ];
        for sample in samples {
            let once = normalize_key(sample);
            assert_eq!(normalize_key(&once), once, "{sample:?}");
        }
    }

    #[test]
    fn segment_spaces_become_colons() {
        assert_eq!(normalize_segment("  User   Profile "), "user:profile");
    }

    #[test]
    fn build_key_skips_blank_segments() {
        assert_eq!(build_key(&["Mastermind", "  ", "", "Game  Id", "\u{0}"]), "mastermind:game:id");
    }

    #[test]
    fn blank_whole_key_is_invalid() {
        assert!(StoreKey::from("   ").normalize().is_err());
    }

    #[test]
    fn all_blank_segments_are_invalid() {
        assert!(StoreKey::from(["", " ", "\t"]).normalize().is_err());
        assert!(StoreKey::Segments(Vec::new()).normalize().is_err());
    }
}
