// ABOUTME: JWT-based manager authentication for the booking platform
// ABOUTME: Handles token generation, validation, and expiry diagnostics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Eventra

//! # Authentication and Session Management
//!
//! HS256 `JWT` issuing and validation for manager accounts. Tokens carry the
//! manager id as `sub` and are checked on every authenticated route.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{limits, service_names};
use crate::models::Manager;

/// Convert a duration to a human-readable format
fn humanize_duration(duration: Duration) -> String {
    let total_secs = duration.num_seconds().abs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;

    if hours > 0 {
        format!("{hours} hours")
    } else if minutes > 0 {
        format!("{minutes} minutes")
    } else {
        format!("{total_secs} seconds")
    }
}

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let duration_expired = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "JWT token expired {} ago at {}",
                    humanize_duration(duration_expired),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

/// `JWT` claims for manager authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Manager `ID`
    pub sub: String,
    /// Manager email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// Authentication manager for HS256 `JWT` tokens
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    /// Monotonic counter to ensure unique timestamps for tokens
    token_counter: AtomicU64,
}

impl Clone for AuthManager {
    fn clone(&self) -> Self {
        Self {
            encoding_key: self.encoding_key.clone(),
            decoding_key: self.decoding_key.clone(),
            token_expiry_hours: self.token_expiry_hours,
            // Each instance maintains iat uniqueness independently
            token_counter: AtomicU64::new(0),
        }
    }
}

impl AuthManager {
    /// Create a new authentication manager from a shared secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            token_counter: AtomicU64::new(0),
        }
    }

    /// Generate a `JWT` token for a manager
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails due to invalid claims
    pub fn generate_token(&self, manager: &Manager) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        // Use atomic counter to ensure unique issued-at times
        let counter = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let unique_iat =
            now.timestamp() * 1000 + i64::from(u32::try_from(counter % 1000).unwrap_or(0));

        let claims = Claims {
            sub: manager.id.to_string(),
            email: manager.email.clone(),
            iat: unique_iat,
            exp: expiry.timestamp(),
            aud: service_names::EVENTRA_SERVER.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(token)
    }

    /// Validate a `JWT` token and return its claims
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Token signature is invalid
    /// - Token has expired
    /// - Token is malformed or not valid JWT format
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[service_names::EVENTRA_SERVER]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {:?}", e);
            e
        })?;

        Ok(token_data.claims)
    }

    /// Validate a `JWT` token with detailed error information
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if:
    /// - Token signature is invalid
    /// - Token has expired
    /// - Token is malformed or not valid JWT format
    pub fn validate_token_detailed(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let claims = self.decode_token_claims(token)?;
        Self::validate_claims_expiry(&claims)?;

        tracing::debug!("JWT token validation successful for manager: {}", claims.sub);
        Ok(claims)
    }

    /// Decode `JWT` token claims without expiration validation
    fn decode_token_claims(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation_no_exp = Validation::new(Algorithm::HS256);
        validation_no_exp.validate_exp = false;
        validation_no_exp.set_audience(&[service_names::EVENTRA_SERVER]);

        decode::<Claims>(token, &self.decoding_key, &validation_no_exp)
            .map(|token_data| token_data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))
    }

    /// Validate claims expiration with detailed logging
    fn validate_claims_expiry(claims: &Claims) -> Result<(), JwtValidationError> {
        let current_time = Utc::now();
        let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);

        if current_time.timestamp() > claims.exp {
            let time_since_expiry = current_time.signed_duration_since(expired_at);
            tracing::warn!(
                "JWT token expired for manager: {} - Expired {} ago at {}",
                claims.sub,
                humanize_duration(time_since_expiry),
                expired_at.to_rfc3339()
            );
            return Err(JwtValidationError::TokenExpired {
                expired_at,
                current_time,
            });
        }
        Ok(())
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::warn!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }

    /// Extract manager `ID` from a token without expiry validation
    ///
    /// Used for database lookups when the token might be expired.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Token signature is invalid
    /// - Token is malformed
    /// - Manager ID in token is not a valid UUID
    pub fn extract_manager_id(&self, token: &str) -> Result<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Uuid::parse_str(&token_data.claims.sub).with_context(|| {
            format!(
                "Failed to parse manager ID from JWT token subject: {}",
                token_data.claims.sub
            )
        })
    }
}

/// Generate a random `JWT` secret
#[must_use]
pub fn generate_jwt_secret() -> [u8; 64] {
    use rand::RngCore;

    let mut secret = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

/// Hash a password for storage
///
/// # Errors
///
/// Returns an error if bcrypt hashing fails
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, limits::BCRYPT_COST).context("Failed to hash password")
}

/// Check a password against a stored hash
///
/// # Errors
///
/// Returns an error if the stored hash is malformed
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    bcrypt::verify(password, password_hash).context("Failed to verify password")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_manager() -> Manager {
        Manager::new(
            "owner@example.com".into(),
            "not-a-real-hash".into(),
            "Prime Events".into(),
            "Sam Owner".into(),
        )
    }

    #[test]
    fn test_token_roundtrip() {
        let auth = AuthManager::new(b"test-secret-key", 24);
        let manager = test_manager();

        let token = auth.generate_token(&manager).unwrap();
        let claims = auth.validate_token(&token).unwrap();

        assert_eq!(claims.sub, manager.id.to_string());
        assert_eq!(claims.email, manager.email);
        assert_eq!(claims.aud, service_names::EVENTRA_SERVER);
    }

    #[test]
    fn test_expired_token_detected() {
        let auth = AuthManager::new(b"test-secret-key", -1);
        let manager = test_manager();

        let token = auth.generate_token(&manager).unwrap();
        let result = auth.validate_token_detailed(&token);

        assert!(matches!(
            result,
            Err(JwtValidationError::TokenExpired { .. })
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = AuthManager::new(b"secret-one", 24);
        let other = AuthManager::new(b"secret-two", 24);
        let manager = test_manager();

        let token = auth.generate_token(&manager).unwrap();
        let result = other.validate_token_detailed(&token);

        assert!(matches!(
            result,
            Err(JwtValidationError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_garbage_token_malformed() {
        let auth = AuthManager::new(b"test-secret-key", 24);

        let result = auth.validate_token_detailed("not.a.jwt");
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_manager_id_from_expired_token() {
        let auth = AuthManager::new(b"test-secret-key", -1);
        let manager = test_manager();

        let token = auth.generate_token(&manager).unwrap();
        let extracted = auth.extract_manager_id(&token).unwrap();

        assert_eq!(extracted, manager.id);
    }

    #[test]
    fn test_generated_secret_is_not_all_zero() {
        let secret = generate_jwt_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert_ne!(hash, "correct horse battery");
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }
}
