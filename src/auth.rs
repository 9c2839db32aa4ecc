//! Credential hashing and session tokens.
//!
//! Stored password format: `sha256$<iterations>$<salt-hex>$<digest-hex>`.
//! Session tokens are random and only their SHA-256 digest is persisted.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const HASH_SCHEME: &str = "sha256";
pub const HASH_ITERATIONS: u32 = 10_000;
const SALT_LEN: usize = 16;

pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    hash_with_salt(password, &salt, HASH_ITERATIONS)
}

fn hash_with_salt(password: &str, salt: &[u8], iterations: u32) -> String {
    let digest = derive(password.as_bytes(), salt, iterations);
    format!(
        "{HASH_SCHEME}${iterations}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    )
}

fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut digest: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password)
        .finalize()
        .into();

    for _ in 1..iterations {
        digest = Sha256::new()
            .chain_update(salt)
            .chain_update(digest)
            .finalize()
            .into();
    }

    digest
}

/// Returns false for malformed stored hashes instead of failing.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if scheme != HASH_SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };

    let actual = derive(password.as_bytes(), &salt, iterations);
    bool::from(actual.as_slice().ct_eq(expected.as_slice()))
}

/// A freshly issued bearer token: `token` goes to the caller, `digest` to storage.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub digest: String,
}

pub fn issue_token() -> IssuedToken {
    let bytes: [u8; 32] = rand::random();
    let token = hex::encode(bytes);
    let digest = token_digest(&token);
    IssuedToken { token, digest }
}

pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let stored = hash_password("Abc123!");
        assert!(stored.starts_with("sha256$10000$"));
        assert!(!stored.contains("Abc123!"));
        assert!(verify_password("Abc123!", &stored));
        assert!(!verify_password("Abc123?", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_password("Abc123!"), hash_password("Abc123!"));
    }

    #[test]
    fn known_salt_is_deterministic() {
        let a = hash_with_salt("Abc123!", b"0123456789abcdef", 3);
        let b = hash_with_salt("Abc123!", b"0123456789abcdef", 3);
        assert_eq!(a, b);
        assert!(verify_password("Abc123!", &a));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("Abc123!", "Abc123!"));
        assert!(!verify_password("Abc123!", "sha256$x$00$00"));
        assert!(!verify_password("Abc123!", "sha256$0$00$00"));
        assert!(!verify_password("Abc123!", "md5$1$00$00"));
        assert!(!verify_password("Abc123!", "sha256$1$zz$00"));
    }

    #[test]
    fn issued_token_digest_matches() {
        let issued = issue_token();
        assert_eq!(issued.token.len(), 64);
        assert_eq!(token_digest(&issued.token), issued.digest);
        assert_ne!(issued.token, issue_token().token);
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
