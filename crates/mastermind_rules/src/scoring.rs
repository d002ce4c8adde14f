//! Feedback computation for a single guess.

use std::collections::HashMap;

use tracing::instrument;

use crate::Feedback;

/// Scores `guess` against `secret`.
///
/// `correct_positions` counts indices where both sequences hold the same
/// digit. `correct_numbers` sums, for every digit in the secret, the smaller
/// of its occurrence counts in the secret and in the guess, so it always
/// includes the positional matches.
///
/// Both slices must have the same length; validate the guess first.
#[instrument(skip_all, fields(len = secret.len()))]
pub fn score(secret: &[i32], guess: &[i32]) -> Feedback {
    debug_assert_eq!(secret.len(), guess.len());

    let correct_positions = count_position_matches(secret, guess);
    let correct_numbers = count_shared_digits(&tally(secret), &tally(guess));

    Feedback::new(correct_positions, correct_numbers)
}

fn count_position_matches(secret: &[i32], guess: &[i32]) -> u32 {
    secret
        .iter()
        .zip(guess)
        .filter(|(s, g)| s == g)
        .count() as u32
}

/// Occurrence count per digit value.
fn tally(digits: &[i32]) -> HashMap<i32, u32> {
    let mut counts = HashMap::new();
    for &digit in digits {
        *counts.entry(digit).or_insert(0) += 1;
    }
    counts
}

fn count_shared_digits(secret_tally: &HashMap<i32, u32>, guess_tally: &HashMap<i32, u32>) -> u32 {
    secret_tally
        .iter()
        .map(|(digit, &in_secret)| in_secret.min(guess_tally.get(digit).copied().unwrap_or(0)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(secret: &[i32], guess: &[i32]) -> (u32, u32) {
        let feedback = score(secret, guess);
        (*feedback.correct_positions(), *feedback.correct_numbers())
    }

    /// Every 4-digit sequence over `0..=3`.
    fn all_codes() -> Vec<[i32; 4]> {
        let mut codes = Vec::with_capacity(256);
        for n in 0..256 {
            codes.push([n & 3, (n >> 2) & 3, (n >> 4) & 3, (n >> 6) & 3]);
        }
        codes
    }

    #[test]
    fn duplicate_digits_counted_once_per_shared_occurrence() {
        assert_eq!(counts(&[1, 1, 2, 3], &[1, 2, 2, 4]), (1, 2));
    }

    #[test]
    fn exact_match_scores_full_length() {
        assert_eq!(counts(&[0, 1, 2, 3], &[0, 1, 2, 3]), (4, 4));
    }

    #[test]
    fn disjoint_digits_score_zero() {
        assert_eq!(counts(&[0, 0, 1, 1], &[5, 6, 7, 5]), (0, 0));
    }

    #[test]
    fn permutation_scores_all_numbers_no_positions() {
        assert_eq!(counts(&[1, 2, 3, 4], &[4, 3, 2, 1]), (0, 4));
    }

    #[test]
    fn correct_numbers_never_below_correct_positions() {
        let codes = all_codes();
        for secret in &codes {
            for guess in &codes {
                let (positions, numbers) = counts(secret, guess);
                assert!(numbers >= positions, "{secret:?} vs {guess:?}");
                assert!(numbers <= 4);
            }
        }
    }

    #[test]
    fn scoring_is_symmetric() {
        let codes = all_codes();
        for secret in &codes {
            for guess in &codes {
                assert_eq!(counts(secret, guess), counts(guess, secret), "{secret:?} vs {guess:?}");
            }
        }
    }
}
