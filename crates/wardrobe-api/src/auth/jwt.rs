// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token codec.
//!
//! Tokens are self-contained: the only state is the signing secret, fixed when
//! the [`JwtManager`] is built. Validation distinguishes three failure kinds
//! for logging, but every kind means the same thing to callers: reject.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wardrobe_core::types::Subject;

use super::Claims;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// TokenError
// =============================================================================

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Structure, encoding or claims could not be parsed.
    #[error("malformed token")]
    Malformed,
    /// The MAC does not match header and claims.
    #[error("bad token signature")]
    BadSignature,
    /// The expiry instant has passed.
    #[error("token expired")]
    Expired,
}

impl TokenError {
    /// Short label for structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::BadSignature => "bad_signature",
            TokenError::Expired => "expired",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token lifetime in seconds.
    pub expiration_secs: i64,
    /// HMAC algorithm used for signing.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
    /// Keep an in-process deny list so logout revokes the token.
    pub revocation: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            issuer: "wardrobe".to_string(),
            expiration_secs: 86400, // 24 hours
            algorithm: Algorithm::HS256,
            leeway_secs: 0,
            revocation: false,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the token lifetime.
    pub fn with_expiration(mut self, duration: Duration) -> Self {
        self.expiration_secs = duration.as_secs() as i64;
        self
    }

    /// Enables the logout deny list.
    pub fn with_revocation(mut self, enabled: bool) -> Self {
        self.revocation = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::internal("JWT secret is not configured"));
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ApiError::internal(
                "JWT algorithm must be one of HS256, HS384, HS512",
            ));
        }
        if self.expiration_secs <= 0 {
            return Err(ApiError::internal("JWT expiration must be positive"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

// =============================================================================
// JwtManager
// =============================================================================

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a new JWT manager with the given configuration.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs arbitrary claims.
    pub fn create_token(&self, claims: &Claims) -> ApiResult<String> {
        let header = Header::new(self.config.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to create token: {}", e)))
    }

    /// Issues a token for `subject` with the configured lifetime.
    pub fn issue(&self, subject: Subject) -> ApiResult<String> {
        let claims =
            Claims::new(subject, self.config.expiration_secs).with_issuer(&self.config.issuer);
        self.create_token(&claims)
    }

    /// Verifies signature, issuer and expiry, and returns the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Verifies a token and returns the subject it was issued for.
    pub fn validate(&self, token: &str) -> Result<Subject, TokenError> {
        self.decode(token)?.subject()
    }

    /// Returns the token lifetime in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.config.expiration_secs
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("expiration_secs", &self.config.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            _ => "HS256",
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported algorithm: {} (expected HS256, HS384 or HS512)",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wardrobe_core::types::{Role, UserId};

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-that-is-long-enough-for-testing")
    }

    fn subject() -> Subject {
        Subject::new(UserId::new(42), Role::User)
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let manager = JwtManager::new(test_config()).unwrap();

        for subject in [
            Subject::new(UserId::new(1), Role::User),
            Subject::new(UserId::new(i64::MAX), Role::Admin),
        ] {
            let token = manager.issue(subject).unwrap();
            assert_eq!(token.split('.').count(), 3);
            assert_eq!(manager.validate(&token).unwrap(), subject);
        }
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new(test_config()).unwrap();

        let claims = Claims::new(subject(), -3600).with_issuer(manager.issuer());
        let token = manager.create_token(&claims).unwrap();

        assert_eq!(manager.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_claims() {
        let manager = JwtManager::new(test_config()).unwrap();
        let user_token = manager.issue(subject()).unwrap();
        let admin_token = manager
            .issue(Subject::new(UserId::new(42), Role::Admin))
            .unwrap();

        // Admin payload spliced onto the user token's signature.
        let user: Vec<&str> = user_token.split('.').collect();
        let admin: Vec<&str> = admin_token.split('.').collect();
        let forged = format!("{}.{}.{}", user[0], admin[1], user[2]);

        assert_eq!(manager.validate(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_every_byte_flip_is_rejected() {
        let manager = JwtManager::new(test_config()).unwrap();
        let token = manager.issue(subject()).unwrap();
        let header_len = token.find('.').unwrap();

        for (i, c) in token.char_indices().skip(header_len + 1) {
            if c == '.' {
                continue;
            }
            let replacement = if c == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(i..i + 1, &replacement.to_string());

            let result = manager.validate(&tampered);
            assert!(
                matches!(
                    result,
                    Err(TokenError::BadSignature) | Err(TokenError::Malformed)
                ),
                "position {i}: {result:?}"
            );
        }
    }

    #[test]
    fn test_malformed_token() {
        let manager = JwtManager::new(test_config()).unwrap();

        assert_eq!(manager.validate(""), Err(TokenError::Malformed));
        assert_eq!(manager.validate("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(
            manager.validate("invalid.token.here"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 = JwtManager::new(JwtConfig::new("secret-one-for-testing-purposes")).unwrap();
        let manager2 = JwtManager::new(JwtConfig::new("secret-two-for-testing-purposes")).unwrap();

        let token = manager1.issue(subject()).unwrap();

        assert_eq!(manager2.validate(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let ours = JwtManager::new(test_config()).unwrap();
        let theirs = JwtManager::new(test_config().with_issuer("elsewhere")).unwrap();

        let token = theirs.issue(subject()).unwrap();
        assert_eq!(ours.validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_config_rejects_empty_secret() {
        assert!(JwtManager::new(JwtConfig::default()).is_err());
    }
}
