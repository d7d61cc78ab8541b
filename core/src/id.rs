//! Short-identifier generation.
//!
//! Reservation and invoice identifiers are eight characters drawn from the
//! uppercase-alphanumeric alphabet. Client identifiers are eight digits
//! followed by one uppercase letter. Candidates are a pure function of the
//! supplied randomness source, so a seeded generator reproduces the same
//! sequence in tests.
//!
//! Generation only guards against the exclusion set it is handed; the
//! store's primary key is the global uniqueness backstop, and writers
//! re-draw on a unique violation.

use std::collections::HashSet;

use rand::Rng;

use crate::error::{DomainError, Result};

/// Alphabet for reservation and invoice identifiers.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of reservation and invoice identifiers.
pub const CODE_LEN: usize = 8;

/// Digits in a client identifier, before the trailing letter.
pub const CLIENT_DIGITS: usize = 8;

/// Upper bound on draws before generation reports exhaustion.
pub const MAX_ATTEMPTS: u32 = 64;

/// The identifier families the platform allocates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// Reservation identifiers, e.g. `K7Q2M9XA`.
    Reservation,
    /// Invoice identifiers, same alphabet and length as reservations.
    Invoice,
    /// Client identifiers, e.g. `04821733Z`.
    Client,
}

impl IdKind {
    /// Draws a single candidate identifier from `rng`.
    #[must_use]
    pub fn candidate(self, rng: &mut impl Rng) -> String {
        match self {
            Self::Reservation | Self::Invoice => (0..CODE_LEN)
                .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
                .collect(),
            Self::Client => {
                let mut id: String = (0..CLIENT_DIGITS)
                    .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                    .collect();
                id.push(char::from(b'A' + rng.gen_range(0..26u8)));
                id
            }
        }
    }

    /// Returns `true` if `candidate` matches this kind's format.
    ///
    /// # Examples
    ///
    /// ```
    /// # use the_knife_core::id::IdKind;
    /// assert!(IdKind::Reservation.matches("K7Q2M9XA"));
    /// assert!(!IdKind::Reservation.matches("k7q2m9xa"));
    /// assert!(IdKind::Client.matches("04821733Z"));
    /// assert!(!IdKind::Client.matches("0482173Z"));
    /// ```
    #[must_use]
    pub fn matches(self, candidate: &str) -> bool {
        match self {
            Self::Reservation | Self::Invoice => {
                candidate.len() == CODE_LEN
                    && candidate.bytes().all(|b| CODE_ALPHABET.contains(&b))
            }
            Self::Client => {
                candidate.len() == CLIENT_DIGITS + 1
                    && candidate
                        .bytes()
                        .take(CLIENT_DIGITS)
                        .all(|b| b.is_ascii_digit())
                    && candidate
                        .bytes()
                        .nth(CLIENT_DIGITS)
                        .is_some_and(|b| b.is_ascii_uppercase())
            }
        }
    }
}

/// Generates a fresh identifier of `kind` that is not in `excluded`.
///
/// Re-draws on collision with the exclusion set, up to [`MAX_ATTEMPTS`]
/// times. `excluded` only covers identifiers the caller already knows
/// about; writers still rely on the primary key to fail a concurrent
/// duplicate and then call this again.
///
/// # Errors
///
/// Returns [`DomainError::Store`] when every draw collided, which means
/// the caller's identifier space is effectively saturated.
pub fn generate(kind: IdKind, rng: &mut impl Rng, excluded: &HashSet<String>) -> Result<String> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = kind.candidate(rng);
        if !excluded.contains(&candidate) {
            return Ok(candidate);
        }
    }
    Err(DomainError::Store(format!(
        "identifier generation exhausted after {MAX_ATTEMPTS} attempts"
    )))
}
