//! Human-readable order numbers.

use uuid::Uuid;

/// Prefix of every generated order number.
pub const ORDER_NUMBER_PREFIX: &str = "WC-";

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 5;

/// Source of candidate order numbers.
///
/// Candidates need not be unique; the store rejects duplicates and the
/// service asks for another.
pub trait OrderNumberGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates `WC-` followed by five random uppercase alphanumerics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrderNumbers;

impl OrderNumberGenerator for RandomOrderNumbers {
    fn generate(&self) -> String {
        let random = Uuid::new_v4();
        let mut number = String::with_capacity(ORDER_NUMBER_PREFIX.len() + SUFFIX_LEN);
        number.push_str(ORDER_NUMBER_PREFIX);
        // 256 is not a multiple of 36, so A-D are drawn slightly more often.
        // Collisions are retried by the service.
        number.extend(
            random.as_bytes()[..SUFFIX_LEN]
                .iter()
                .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char),
        );
        number
    }
}

/// Returns true if `value` has the shape of a generated order number.
pub fn is_well_formed(value: &str) -> bool {
    value.strip_prefix(ORDER_NUMBER_PREFIX).is_some_and(|suffix| {
        suffix.len() == SUFFIX_LEN
            && suffix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    })
}
