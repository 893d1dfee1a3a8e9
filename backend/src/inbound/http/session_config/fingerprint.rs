//! Session key fingerprinting for operational visibility.
//!
//! Operators compare the logged fingerprint across replicas to confirm they
//! share one session key without the key itself reaching the logs.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Bytes of the SHA-256 digest kept before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 fingerprint of the key's signing material, as 16
/// lowercase hex characters.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use satisfacture::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_key_same_fingerprint() {
        let key = Key::derive_from(&[b'a'; 64]);
        assert_eq!(key_fingerprint(&key), key_fingerprint(&key));
    }

    #[rstest]
    fn fingerprint_is_short_lowercase_hex() {
        let fp = key_fingerprint(&Key::generate());
        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[rstest]
    fn different_keys_differ() {
        let first = Key::derive_from(&[b'a'; 64]);
        let second = Key::derive_from(&[b'b'; 64]);
        assert_ne!(key_fingerprint(&first), key_fingerprint(&second));
    }
}
