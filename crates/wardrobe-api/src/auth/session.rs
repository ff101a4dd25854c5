// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account registration, login and logout.
//!
//! Sessions are the tokens themselves; nothing is stored per session. The
//! only server-side state is the optional [`DenyList`] consulted after
//! logout.

use std::sync::Arc;

use serde::Deserialize;

use wardrobe_core::types::{NewUser, Role, Subject};
use wardrobe_core::{ShopStore, StoreError};

use super::password::{dummy_hash, hash_password, verify_password};
use super::{DenyList, JwtManager};
use crate::error::{ApiError, ApiResult, ValidationErrors};

/// Minimum login length.
pub const MIN_LOGIN_LEN: usize = 5;

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Self-registration request body.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    /// Unique login name.
    pub login: String,
    /// Plain-text password.
    pub password: String,
    /// Display name. Defaults to the login.
    #[serde(default)]
    pub name: Option<String>,
}

impl Registration {
    /// Checks length limits on login and password.
    pub fn validate(&self) -> ApiResult<()> {
        let mut errors = ValidationErrors::new();
        if self.login.trim().chars().count() < MIN_LOGIN_LEN {
            errors.add(
                "login",
                format!("must be at least {} characters", MIN_LOGIN_LEN),
            );
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }
        errors.into_result(())
    }
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Login name.
    pub login: String,
    /// Plain-text password.
    pub password: String,
}

/// Issues and revokes session tokens against the account store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn ShopStore>,
    jwt: Arc<JwtManager>,
    deny_list: Option<Arc<DenyList>>,
}

impl SessionManager {
    /// Creates a manager. Without a deny list, logout is a no-op.
    pub fn new(
        store: Arc<dyn ShopStore>,
        jwt: Arc<JwtManager>,
        deny_list: Option<Arc<DenyList>>,
    ) -> Self {
        Self {
            store,
            jwt,
            deny_list,
        }
    }

    /// Creates a `user` account and returns a token for it.
    pub async fn register(&self, registration: Registration) -> ApiResult<String> {
        registration.validate()?;

        let login = registration.login.trim().to_string();
        let name = registration
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| login.clone());
        let password_hash = hash_blocking(registration.password).await?;

        let user = self
            .store
            .insert_user(NewUser {
                login,
                name,
                role: Role::User,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate { .. } => ApiError::conflict("Login is already taken"),
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, "Account registered");
        self.jwt.issue(user.subject())
    }

    /// Verifies credentials and returns a fresh token.
    ///
    /// Unknown logins and wrong passwords fail the same way and both pay for
    /// one Argon2 verification.
    pub async fn login(&self, credentials: Credentials) -> ApiResult<String> {
        let user = self.store.user_by_login(credentials.login.trim()).await?;

        let hash = user
            .as_ref()
            .map_or_else(|| dummy_hash().to_string(), |u| u.password_hash.clone());
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&credentials.password, &hash))
                .await?;

        let user = match user {
            Some(user) if matches => user,
            Some(user) => {
                tracing::debug!(user_id = %user.id, "Password mismatch");
                return Err(ApiError::InvalidCredentials);
            }
            None => {
                tracing::debug!("Unknown login");
                return Err(ApiError::InvalidCredentials);
            }
        };

        tracing::info!(user_id = %user.id, "User logged in");
        self.jwt.issue(user.subject())
    }

    /// Revokes a token until it would have expired anyway.
    ///
    /// Returns `false` when revocation is disabled.
    pub fn logout(&self, token_id: &str, expires_at: i64) -> bool {
        match &self.deny_list {
            Some(list) => {
                list.revoke(token_id, expires_at);
                tracing::info!(token_id = token_id, "Token revoked");
                true
            }
            None => false,
        }
    }

    /// Creates the configured admin account unless the login already exists.
    ///
    /// Returns the admin's subject either way.
    pub async fn ensure_admin(
        &self,
        login: &str,
        password: &str,
        name: &str,
    ) -> ApiResult<Subject> {
        if let Some(existing) = self.store.user_by_login(login).await? {
            if existing.role != Role::Admin {
                return Err(ApiError::conflict(format!(
                    "Login '{}' exists and is not an admin",
                    login
                )));
            }
            return Ok(existing.subject());
        }

        let password_hash = hash_blocking(password.to_string()).await?;
        let user = self
            .store
            .insert_user(NewUser {
                login: login.to_string(),
                name: name.to_string(),
                role: Role::Admin,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, login = login, "Admin account created");
        Ok(user.subject())
    }

    /// Returns the token codec.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }
}

async fn hash_blocking(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_limits() {
        let ok = Registration {
            login: "alice".into(),
            password: "12345678".into(),
            name: None,
        };
        assert!(ok.validate().is_ok());

        let short_login = Registration {
            login: "al".into(),
            ..ok.clone()
        };
        assert!(short_login.validate().is_err());

        let short_password = Registration {
            password: "1234567".into(),
            ..ok.clone()
        };
        assert!(short_password.validate().is_err());
    }

    fn manager() -> SessionManager {
        let store: Arc<dyn ShopStore> = Arc::new(wardrobe_store::MemoryStore::new());
        let jwt = JwtManager::new(crate::auth::JwtConfig::new(
            "session-test-secret-that-is-long-enough",
        ))
        .unwrap();
        SessionManager::new(store, Arc::new(jwt), None)
    }

    #[tokio::test]
    async fn test_unknown_login_still_verifies_a_hash() {
        let sessions = manager();
        sessions
            .register(Registration {
                login: "known".into(),
                password: "right-password".into(),
                name: None,
            })
            .await
            .unwrap();

        let unknown = sessions
            .login(Credentials {
                login: "stranger".into(),
                password: "right-password".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(unknown, ApiError::InvalidCredentials));
        assert!(crate::auth::password::dummy_hash_initialized());

        let wrong = sessions
            .login(Credentials {
                login: "known".into(),
                password: "wrong-password".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong, ApiError::InvalidCredentials));

        let ok = sessions
            .login(Credentials {
                login: "known".into(),
                password: "right-password".into(),
            })
            .await;
        assert!(ok.is_ok());
    }

    #[test]
    fn test_login_is_trimmed_before_length_check() {
        let padded = Registration {
            login: "  ab  ".into(),
            password: "12345678".into(),
            name: None,
        };
        assert!(padded.validate().is_err());
    }
}
