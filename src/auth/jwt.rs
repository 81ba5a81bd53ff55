//! JWT Token Handler
//! Mission: Issue signed, time-bounded bearer tokens and validate them back into a subject

use crate::auth::models::Claims;
use crate::config::{Config, DEFAULT_TOKEN_EXPIRE_HOURS};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use tracing::debug;

/// Why a token was refused. Operator-facing only; clients see one generic 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not verify")]
    BadSignature,
    #[error("token header names an unexpected algorithm")]
    WrongAlgorithm,
    #[error("token has expired")]
    Expired,
    #[error("token carries no subject claim")]
    MissingSubject,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm => TokenError::WrongAlgorithm,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    algorithm: Algorithm,
    expiration_hours: i64,
}

impl JwtHandler {
    /// HS256 with the default 24-hour lifetime
    pub fn new(secret: String) -> Self {
        Self::with_settings(secret, Algorithm::HS256, DEFAULT_TOKEN_EXPIRE_HOURS)
    }

    pub fn with_settings(secret: String, algorithm: Algorithm, expiration_hours: i64) -> Self {
        Self {
            secret,
            algorithm,
            expiration_hours,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_settings(
            config.secret_key.clone(),
            config.jwt_algorithm,
            config.token_expire_hours,
        )
    }

    pub fn expiration_hours(&self) -> i64 {
        self.expiration_hours
    }

    /// Sign `{sub, iat, exp = now + ttl}`. A zero or negative ttl yields a
    /// token that is already expired.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .context("Invalid token expiry")?
            .timestamp();

        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: expiration,
            iat: now.timestamp(),
        };

        debug!(
            "Issuing {:?} token for {}, expires at {}",
            self.algorithm, subject, expiration
        );

        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign JWT")
    }

    /// Issue with the configured lifetime
    pub fn issue_default(&self, subject: &str) -> Result<String> {
        self.issue(subject, Duration::hours(self.expiration_hours))
    }

    /// Verify signature, algorithm and expiry, then return the subject.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;

        // jsonwebtoken only rejects exp < now; a token expiring this second is dead too.
        if decoded.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        match decoded.claims.sub {
            Some(sub) if !sub.trim().is_empty() => Ok(sub),
            _ => Err(TokenError::MissingSubject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-secret-key-12345";

    fn handler() -> JwtHandler {
        JwtHandler::new(SECRET.to_string())
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let token = handler().issue("alice", Duration::hours(1)).unwrap();
        assert!(!token.is_empty());
        assert_eq!(handler().validate(&token).unwrap(), "alice");
    }

    #[test]
    fn test_issue_default_uses_configured_hours() {
        let handler = JwtHandler::with_settings(SECRET.into(), Algorithm::HS256, 2);
        assert_eq!(handler.expiration_hours(), 2);

        let token = handler.issue_default("bob").unwrap();
        assert_eq!(handler.validate(&token).unwrap(), "bob");
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let token = handler().issue("alice", Duration::zero()).unwrap();
        assert_eq!(handler().validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_past_expiry_is_rejected() {
        let token = handler().issue("alice", Duration::hours(-1)).unwrap();
        assert_eq!(handler().validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(
            handler().validate("invalid.token.here"),
            Err(TokenError::Malformed)
        );
        assert_eq!(handler().validate(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_different_secrets_reject() {
        let other = JwtHandler::new("another-secret".to_string());
        let token = other.issue("alice", Duration::hours(1)).unwrap();
        assert_eq!(handler().validate(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let hs384 = JwtHandler::with_settings(SECRET.into(), Algorithm::HS384, 1);
        let token = hs384.issue("alice", Duration::hours(1)).unwrap();
        assert_eq!(handler().validate(&token), Err(TokenError::WrongAlgorithm));
    }

    #[test]
    fn test_missing_subject_rejected() {
        let exp = Utc::now().timestamp() + 3600;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "exp": exp }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(handler().validate(&token), Err(TokenError::MissingSubject));
    }

    #[test]
    fn test_missing_expiry_is_malformed() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "sub": "alice" }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(handler().validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_token_carries_expected_claims() {
        let token = handler().issue("alice@x.com", Duration::hours(3)).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(claims.sub.as_deref(), Some("alice@x.com"));
        assert_eq!(claims.exp - claims.iat, 3 * 3600);
    }
}
