//! Short shareable group-join codes.
//!
//! # Responsibility
//! - Generate random trust codes and check their canonical form.
//! - Convert between typed/display forms and the canonical form.
//!
//! # Invariants
//! - Canonical codes are exactly 6 characters from `[A-Z0-9]`.
//! - Global uniqueness is not checked here; callers regenerate on conflict.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

/// Number of symbols in a canonical code.
pub const TRUST_CODE_LEN: usize = 6;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const DISPLAY_SPLIT: usize = 3;

static TRUST_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{6}$").expect("valid trust code regex"));

/// Generates a code from the thread-local RNG.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

/// Generates a code from a caller-supplied RNG.
///
/// Each symbol is drawn uniformly and independently from the 36-symbol
/// alphabet.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TRUST_CODE_LEN)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

/// Whether `code` is in canonical form. Case-sensitive; separators rejected.
pub fn is_valid(code: &str) -> bool {
    TRUST_CODE_RE.is_match(code)
}

/// Strips hyphens and whitespace and upper-cases user input.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Display form `ABC-123`. Input of any other length is returned unchanged.
pub fn format(code: &str) -> String {
    if code.chars().count() != TRUST_CODE_LEN {
        return code.to_string();
    }

    let (head, tail): (String, String) = (
        code.chars().take(DISPLAY_SPLIT).collect(),
        code.chars().skip(DISPLAY_SPLIT).collect(),
    );
    format!("{head}-{tail}")
}
