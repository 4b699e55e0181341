//! Credential hashing and access-token primitives
//!
//! Pure functions only — no HTTP framework dependencies. The axum middleware
//! and the `/token` handler live in the service crate.
//!
//! Passwords are stored as salted SHA-256 (`password_hash` + `password_salt`
//! columns in the users table). Access tokens are HS256 JWTs carrying the
//! username as subject, valid for 30 minutes.

use crate::{Error, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Access-token lifetime (30 minutes)
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

// ========================================
// Password Hashing
// ========================================

/// Generate a random alphanumeric salt for a new account
pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Salted SHA-256 password hash, hex encoded
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a plaintext password against a stored hash/salt pair
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

// ========================================
// Access Tokens
// ========================================

/// JWT claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated username
    pub sub: String,
    /// Expiry as Unix epoch seconds
    pub exp: usize,
}

/// Issue an access token for `username`, signed with `secret`
pub fn create_access_token(username: &str, secret: &str, ttl: Duration) -> Result<String> {
    let exp = (chrono::Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64)).timestamp();
    let claims = Claims {
        sub: username.to_string(),
        exp: exp as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token signing failed: {e}")))
}

/// Validate a bearer token and return its claims
///
/// Rejects tampered signatures and expired tokens.
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| Error::Auth(format!("Invalid token: {e}")))
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let salt = generate_salt();
        let hash = hash_password("passwd", &salt);

        assert!(verify_password("passwd", &salt, &hash));
        assert!(!verify_password("wrong", &salt, &hash));
    }

    #[test]
    fn test_distinct_salts_produce_distinct_hashes() {
        let salt_a = generate_salt();
        let salt_b = generate_salt();
        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_password("passwd", &salt_a), hash_password("passwd", &salt_b));
    }

    #[test]
    fn test_token_round_trip() {
        let token = create_access_token("admin", "secret", ACCESS_TOKEN_TTL).unwrap();
        let claims = decode_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let token = create_access_token("admin", "secret", ACCESS_TOKEN_TTL).unwrap();
        let err = decode_access_token(&token, "other-secret").unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Expiry far enough in the past to clear the default validation leeway
        let claims = Claims {
            sub: "admin".to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::seconds(600)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let err = decode_access_token(&token, "secret").unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(decode_access_token("not-a-token", "secret").is_err());
    }
}
