//! Request authentication.
//!
//! Each request carries a `Timestamp` header with the Unix time in seconds
//! and HTTP basic credentials `user_id:sha256hex("{token}:{timestamp}")`.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `"{token}:{timestamp}"`.
#[must_use]
pub fn token_hash(token: &str, timestamp: i64) -> String {
    hex::encode(Sha256::digest(format!("{token}:{timestamp}").as_bytes()))
}

/// Header values for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    /// Value of the `Timestamp` header.
    pub timestamp: String,
    /// Basic auth user name.
    pub user_id: String,
    /// Basic auth password.
    pub password: String,
}

impl AuthHeaders {
    /// Headers for `user_id` at `timestamp`.
    #[must_use]
    pub fn new(user_id: &str, token: &str, timestamp: i64) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            user_id: user_id.to_string(),
            password: token_hash(token, timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_sha256_of_token_and_timestamp() {
        let expected = hex::encode(Sha256::digest(b"abc:1"));
        assert_eq!(token_hash("abc", 1), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn hash_changes_with_timestamp() {
        assert_ne!(token_hash("token", 1_700_000_000), token_hash("token", 1_700_000_001));
    }

    #[test]
    fn headers_carry_user_and_hash() {
        let headers = AuthHeaders::new("42", "secret", 1_700_000_000);
        assert_eq!(headers.timestamp, "1700000000");
        assert_eq!(headers.user_id, "42");
        assert_eq!(headers.password, token_hash("secret", 1_700_000_000));
    }
}
