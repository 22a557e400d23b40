//! Small helpers shared by the call handlers.
//!
//! # Key Components
//!
//! - [`java_string_hash`] - `java.lang.String.hashCode` over UTF-16 code units
//! - [`to_hex`] - Lower-case hex rendering used in packet and transform logs
//! - [`random_digits`] / [`random_alnum`] - Volatile identifiers handed to the guest

use std::fmt::Write;

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

/// Computes `java.lang.String.hashCode()` for the given string.
///
/// The hash is `s[0]*31^(n-1) + s[1]*31^(n-2) + ... + s[n-1]` over the UTF-16 code units of the
/// string, with 32-bit wrapping arithmetic. The empty string hashes to 0.
///
/// # Examples
///
/// ```rust
/// use qsecenv::utils::java_string_hash;
///
/// assert_eq!(java_string_hash(""), 0);
/// assert_eq!(java_string_hash("a"), 97);
/// assert_eq!(java_string_hash("hello"), 99_162_322);
/// ```
#[must_use]
pub fn java_string_hash(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(i32::from(unit))
        })
}

/// Renders bytes as a lower-case hex string without separators.
#[must_use]
pub fn to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Returns a string of `len` uniformly random decimal digits.
///
/// Leading zeros are allowed.
#[must_use]
pub fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Returns a string of `len` alphanumeric characters drawn from the operating system's
/// secure random source.
#[must_use]
pub fn random_alnum(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_string_hash() {
        assert_eq!(java_string_hash(""), 0);
        assert_eq!(java_string_hash("a"), 97);
        assert_eq!(java_string_hash("abc"), 96_354);
        assert_eq!(java_string_hash("hello"), 99_162_322);
        // wraps past i32::MAX
        assert_eq!(java_string_hash("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn test_java_string_hash_non_ascii() {
        // U+4E2D is a single UTF-16 unit
        assert_eq!(java_string_hash("中"), 0x4E2D);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[]), "");
        assert_eq!(to_hex(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
    }

    #[test]
    fn test_random_digits() {
        for len in [0, 1, 7, 10] {
            let value = random_digits(len);
            assert_eq!(value.len(), len);
            assert!(value.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_random_alnum() {
        let value = random_alnum(32);
        assert_eq!(value.len(), 32);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
