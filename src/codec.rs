//! Base-62 short code codec.
//!
//! Maps non-negative integers to strings over `0-9a-zA-Z` (in that order),
//! most-significant digit first, and back again.

use thiserror::Error;

/// Digit alphabet, indexed by digit value.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = ALPHABET.len() as u64;

// 62^11 > u64::MAX, so no u64 needs more than 11 digits.
const MAX_DIGITS: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("cannot encode negative value {0}")]
    InvalidArgument(i64),
    #[error("code {0:?} does not fit in 64 bits")]
    Overflow(String),
}

/// Encode `n` in base 62. Zero encodes to `"0"`, never the empty string.
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::with_capacity(MAX_DIGITS);
    while n > 0 {
        digits.push(ALPHABET[(n % BASE) as usize] as char);
        n /= BASE;
    }
    digits.iter().rev().collect()
}

/// Encode a store id shifted by `offset`. Ids are signed in the database,
/// but the notation is only defined for non-negative values.
pub fn encode_id(id: i64, offset: u64) -> Result<String, CodecError> {
    let n = u64::try_from(id).map_err(|_| CodecError::InvalidArgument(id))?;
    n.checked_add(offset)
        .map(encode)
        .ok_or_else(|| CodecError::Overflow(format!("{id} + {offset}")))
}

/// Decode a base-62 string. The empty string decodes to 0.
pub fn decode(s: &str) -> Result<u64, CodecError> {
    s.chars().enumerate().try_fold(0u64, |acc, (position, character)| {
        let digit = digit_value(character)
            .ok_or(CodecError::InvalidCharacter { character, position })?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| CodecError::Overflow(s.to_string()))
    })
}

/// Returns true if `s` is a non-empty string made only of alphabet characters.
pub fn is_valid_code(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| digit_value(c).is_some())
}

fn digit_value(c: char) -> Option<u64> {
    let v = match c {
        '0'..='9' => c as u64 - '0' as u64,
        'a'..='z' => c as u64 - 'a' as u64 + 10,
        'A'..='Z' => c as u64 - 'A' as u64 + 36,
        _ => return None,
    };
    Some(v)
}
