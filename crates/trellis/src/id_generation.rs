//! Hash-based identifiers for features and timeline items.
//!
//! IDs have the form `{prefix}-{hash}` (e.g. `feat-k3x9`, `item-0c7q`),
//! where the hash is base36-encoded SHA256 over the display name, the
//! owning scope, a timestamp, and a nonce.
//!
//! - **Adaptive length**: 4 characters for small sets, growing to 6
//! - **Collision resistant**: retries with an incrementing nonce, then a
//!   longer hash, against the set of registered IDs
//!
//! ```
//! use trellis::id_generation::IdGenerator;
//!
//! let mut generator = IdGenerator::new("item", 0);
//! let id = generator.generate("Design review", "feat-k3x9").unwrap();
//! assert!(id.starts_with("item-"));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MAX_LENGTH: usize = 6;

/// Errors that can occur during ID generation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdGenerationError {
    /// Every nonce collided at every length
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of hashes tried
        attempts: u32,
    },

    /// Requested hash length was zero
    #[error("Length must be greater than 0")]
    InvalidLength,
}

/// Hash-based ID generator with collision detection.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    existing_ids: HashSet<String>,
    base_length: usize,
}

impl IdGenerator {
    /// Create a generator for `prefix`, sized for a set of `existing` IDs.
    pub fn new(prefix: impl Into<String>, existing: usize) -> Self {
        Self {
            prefix: prefix.into(),
            existing_ids: HashSet::new(),
            base_length: adaptive_length(existing),
        }
    }

    /// Create a generator that avoids every ID in `ids`.
    pub fn with_existing<I, S>(prefix: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let existing_ids: HashSet<String> = ids.into_iter().map(Into::into).collect();
        Self {
            prefix: prefix.into(),
            base_length: adaptive_length(existing_ids.len()),
            existing_ids,
        }
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: impl Into<String>) {
        self.existing_ids.insert(id.into());
    }

    /// Generate a new unique ID for something called `name` within `scope`.
    ///
    /// # Errors
    ///
    /// Returns `CollisionExhausted` if every nonce collides at every
    /// length up to the maximum.
    pub fn generate(&mut self, name: &str, scope: &str) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut attempts = 0;

        for length in self.base_length..=MAX_LENGTH {
            for nonce in 0..MAX_NONCE {
                attempts += 1;
                let id = self.hash_id(name, scope, timestamp, nonce, length)?;
                if self.existing_ids.insert(id.clone()) {
                    if nonce > 0 {
                        debug!(nonce, length, "Generated unique ID after collision retries");
                    }
                    return Ok(id);
                }
            }
            warn!(length, max_nonce = MAX_NONCE, "All nonces exhausted, increasing ID length");
        }

        Err(IdGenerationError::CollisionExhausted { attempts })
    }

    fn hash_id(
        &self,
        name: &str,
        scope: &str,
        timestamp: i64,
        nonce: u32,
        length: usize,
    ) -> Result<String, IdGenerationError> {
        let mut hasher = Sha256::new();
        hasher.update(format!("{name}|{scope}|{timestamp}|{nonce}").as_bytes());
        let hash = hasher.finalize();
        let encoded = encode_base36(&hash[..8], length)?;
        Ok(format!("{}-{encoded}", self.prefix))
    }
}

/// 4 chars up to 500 IDs, 5 up to 1,500, then 6.
fn adaptive_length(existing: usize) -> usize {
    match existing {
        0..=500 => 4,
        501..=1500 => 5,
        _ => 6,
    }
}

/// Encode up to 8 bytes as a fixed-length base36 string.
fn encode_base36(bytes: &[u8], length: usize) -> Result<String, IdGenerationError> {
    if length == 0 {
        return Err(IdGenerationError::InvalidLength);
    }

    let mut n = bytes
        .iter()
        .fold(0u64, |acc, &byte| acc.wrapping_shl(8).wrapping_add(u64::from(byte)));

    let mut result = Vec::with_capacity(length);
    while result.len() < length {
        // n % 36 < 36, so the index is always in range
        let digit = usize::try_from(n % 36).unwrap_or_default();
        result.push(char::from(BASE36_CHARS[digit]));
        n /= 36;
    }
    result.reverse();
    Ok(result.into_iter().collect())
}

/// Whether `id` looks like `{prefix}-{hash}` with a 4-6 char alphanumeric hash.
#[must_use]
pub fn validate_id(id: &str, prefix: &str) -> bool {
    let Some(hash) = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };
    (4..=MAX_LENGTH).contains(&hash.len()) && hash.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn base36_output_has_requested_length() {
        let encoded = encode_base36(&[0x12, 0x34, 0x56, 0x78], 5).unwrap();
        assert_eq!(encoded.len(), 5);
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(encode_base36(&[1], 0), Err(IdGenerationError::InvalidLength));
    }

    #[rstest]
    #[case(0, 4)]
    #[case(500, 4)]
    #[case(800, 5)]
    #[case(2000, 6)]
    fn length_adapts_to_set_size(#[case] existing: usize, #[case] expected: usize) {
        assert_eq!(adaptive_length(existing), expected);
    }

    #[test]
    fn generated_ids_validate() {
        let mut generator = IdGenerator::new("feat", 0);
        let id = generator.generate("Checkout redesign", "").unwrap();
        assert!(validate_id(&id, "feat"));
    }

    #[test]
    fn same_input_yields_distinct_ids() {
        let mut generator = IdGenerator::new("item", 0);
        let first = generator.generate("Design", "feat-1").unwrap();
        let second = generator.generate("Design", "feat-1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn registered_ids_are_avoided() {
        let mut generator = IdGenerator::with_existing("item", ["item-aaaa", "item-bbbb"]);
        generator.register_id("item-cccc");
        let id = generator.generate("Build", "feat-1").unwrap();
        assert!(!["item-aaaa", "item-bbbb", "item-cccc"].contains(&id.as_str()));
    }

    #[rstest]
    #[case("feat-a3f8", true)]
    #[case("feat-abc123", true)]
    #[case("feat-", false)]
    #[case("feat-ab", false)]
    #[case("feat-abcdefg", false)]
    #[case("feat-a3_8", false)]
    #[case("item-a3f8", false)]
    #[case("feata3f8", false)]
    fn id_validation(#[case] id: &str, #[case] valid: bool) {
        assert_eq!(validate_id(id, "feat"), valid);
    }
}
