// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing (Argon2id, PHC string format).

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::OnceLock;

use crate::error::{ApiError, ApiResult};

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored PHC hash.
///
/// An unparseable hash is treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is not a valid PHC string");
            false
        }
    }
}

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Hash of a throwaway password with the same parameters as real accounts.
///
/// Logins for unknown accounts verify against it so they cost the same as a
/// wrong password.
pub fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| hash_password("no-such-account").unwrap_or_default())
}

#[cfg(test)]
pub(crate) fn dummy_hash_initialized() -> bool {
    DUMMY_HASH.get().is_some()
}
