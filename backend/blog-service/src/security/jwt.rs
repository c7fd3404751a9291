//! JWT issuance and validation using RS256 (RSA with SHA-256).
//!
//! Keys are loaded once at startup from PEM material and stored in
//! process-wide `OnceCell`s; no symmetric fallback algorithms are accepted.

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

/// JWT claims: standard claims plus the fields handlers need without a
/// database round trip
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
}

/// Token pair response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Initialize JWT keys from PEM-formatted strings
///
/// Must be called during application startup before any JWT operations.
/// Can only be called once; subsequent calls return an error.
pub fn initialize_jwt_keys(private_key_pem: &str, public_key_pem: &str) -> Result<()> {
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to parse RSA private key: {e}"))?;

    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

    JWT_ENCODING_KEY
        .set(encoding_key)
        .map_err(|_| anyhow!("JWT encoding key already initialized"))?;

    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| anyhow!("JWT decoding key already initialized"))?;

    Ok(())
}

fn get_encoding_key() -> Result<&'static EncodingKey> {
    JWT_ENCODING_KEY.get().ok_or_else(|| {
        anyhow!("JWT keys not initialized. Call initialize_jwt_keys() during startup.")
    })
}

fn get_decoding_key() -> Result<&'static DecodingKey> {
    JWT_DECODING_KEY.get().ok_or_else(|| {
        anyhow!("JWT keys not initialized. Call initialize_jwt_keys() during startup.")
    })
}

/// Generate a new access token (short-lived, for API authentication)
pub fn generate_access_token(user_id: Uuid, email: &str, username: &str) -> Result<String> {
    let now = Utc::now();
    let expiry = now + Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS);

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        token_type: "access".to_string(),
        email: email.to_string(),
        username: username.to_string(),
    };

    let encoding_key = get_encoding_key()?;
    encode(&Header::new(JWT_ALGORITHM), &claims, encoding_key)
        .map_err(|e| anyhow!("Failed to generate access token: {e}"))
}

/// Generate a new refresh token (long-lived, for obtaining new access tokens)
pub fn generate_refresh_token(user_id: Uuid, email: &str, username: &str) -> Result<String> {
    let now = Utc::now();
    let expiry = now + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        token_type: "refresh".to_string(),
        email: email.to_string(),
        username: username.to_string(),
    };

    let encoding_key = get_encoding_key()?;
    encode(&Header::new(JWT_ALGORITHM), &claims, encoding_key)
        .map_err(|e| anyhow!("Failed to generate refresh token: {e}"))
}

/// Generate both access and refresh tokens in one call
pub fn generate_token_pair(user_id: Uuid, email: &str, username: &str) -> Result<TokenResponse> {
    let access_token = generate_access_token(user_id, email, username)?;
    let refresh_token = generate_refresh_token(user_id, email, username)?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: ACCESS_TOKEN_EXPIRY_HOURS * 3600,
    })
}

/// Validate and decode a JWT token
///
/// Verifies the RS256 signature against the initialized public key and
/// checks expiration. Callers are responsible for checking `token_type`.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let decoding_key = get_decoding_key()?;

    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;

    decode::<Claims>(token, decoding_key, &validation)
        .map_err(|e| anyhow!("Token validation failed: {e}"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Once;

    static INIT: Once = Once::new();

    pub(crate) const TEST_PRIVATE_KEY: &str =
        include_str!("../../tests/fixtures/jwt_test_private.pem");
    pub(crate) const TEST_PUBLIC_KEY: &str =
        include_str!("../../tests/fixtures/jwt_test_public.pem");

    /// Initialize the process-wide JWT keys with the test fixtures.
    /// Unit tests across modules share one process, so this must be
    /// idempotent.
    pub(crate) fn init_test_keys() {
        INIT.call_once(|| {
            super::initialize_jwt_keys(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY)
                .expect("test JWT keys should initialize");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate_access_token() {
        test_support::init_test_keys();

        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id, "a@example.com", "alice")
            .expect("should generate token");

        let data = validate_token(&token).expect("token should validate");
        assert_eq!(data.claims.sub, user_id.to_string());
        assert_eq!(data.claims.token_type, "access");
        assert_eq!(data.claims.username, "alice");
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn test_token_pair_types_differ() {
        test_support::init_test_keys();

        let user_id = Uuid::new_v4();
        let pair =
            generate_token_pair(user_id, "b@example.com", "bob").expect("should generate pair");

        let access = validate_token(&pair.access_token).expect("access should validate");
        let refresh = validate_token(&pair.refresh_token).expect("refresh should validate");
        assert_eq!(access.claims.token_type, "access");
        assert_eq!(refresh.claims.token_type, "refresh");
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 3600);
    }

    #[test]
    fn test_tampered_token_rejected() {
        test_support::init_test_keys();

        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id, "c@example.com", "carol")
            .expect("should generate token");

        let mut tampered = token.clone();
        tampered.truncate(token.len() - 4);
        tampered.push_str("AAAA");

        assert!(validate_token(&tampered).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        test_support::init_test_keys();
        assert!(validate_token("not-a-jwt").is_err());
    }
}
