// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `issue-token` command.

use tracing::info;

use wardrobe_api::{Claims, JwtManager};
use wardrobe_config::WardrobeConfig;
use wardrobe_core::Subject;

use crate::cli::{Cli, IssueTokenArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::{jwt_config, RuntimeBuilder};

/// Longest lifetime `--expires-in` accepts: ten years.
pub const MAX_EXPIRES_IN_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Prints a signed token for the requested subject.
pub fn issue_token(cli: &Cli, args: IssueTokenArgs) -> BinResult<()> {
    let runtime = RuntimeBuilder::new().config_path(&cli.config).build()?;
    let token = mint_token(runtime.config(), &args)?;

    info!(user_id = %args.user_id, role = %args.role, "Token issued");
    println!("{}", token);
    Ok(())
}

/// Signs a token with the configured codec.
pub fn mint_token(config: &WardrobeConfig, args: &IssueTokenArgs) -> BinResult<String> {
    let codec = JwtManager::new(jwt_config(config)?)?;
    let subject = Subject::new(args.user_id, args.role);

    let token = match args.expires_in {
        None => codec.issue(subject)?,
        Some(secs) => {
            let secs = i64::try_from(secs)
                .ok()
                .filter(|_| secs <= MAX_EXPIRES_IN_SECS)
                .ok_or_else(|| {
                    BinError::config(format!(
                        "--expires-in must not exceed {} seconds",
                        MAX_EXPIRES_IN_SECS
                    ))
                })?;
            let claims = Claims::new(subject, secs).with_issuer(codec.issuer());
            codec.create_token(&claims)?
        }
    };

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardrobe_config::SecretValue;
    use wardrobe_core::{Role, UserId};

    fn config() -> WardrobeConfig {
        let mut config = WardrobeConfig::default();
        config.jwt.secret = SecretValue::new("issue-token-test-secret-long-enough");
        config
    }

    #[test]
    fn test_minted_token_validates() {
        let config = config();
        let args = IssueTokenArgs {
            user_id: UserId::new(17),
            role: Role::Admin,
            expires_in: None,
        };

        let token = mint_token(&config, &args).unwrap();
        let codec = JwtManager::new(jwt_config(&config).unwrap()).unwrap();
        let subject = codec.validate(&token).unwrap();

        assert_eq!(subject, Subject::new(UserId::new(17), Role::Admin));
    }

    #[test]
    fn test_custom_lifetime() {
        let config = config();
        let args = IssueTokenArgs {
            user_id: UserId::new(3),
            role: Role::User,
            expires_in: Some(120),
        };

        let token = mint_token(&config, &args).unwrap();
        let codec = JwtManager::new(jwt_config(&config).unwrap()).unwrap();
        let claims = codec.decode(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 120);
    }

    #[test]
    fn test_oversized_lifetime_is_rejected() {
        let config = config();
        for expires_in in [MAX_EXPIRES_IN_SECS + 1, i64::MAX as u64, u64::MAX] {
            let args = IssueTokenArgs {
                user_id: UserId::new(3),
                role: Role::User,
                expires_in: Some(expires_in),
            };
            assert!(mint_token(&config, &args).is_err());
        }

        let args = IssueTokenArgs {
            user_id: UserId::new(3),
            role: Role::User,
            expires_in: Some(MAX_EXPIRES_IN_SECS),
        };
        assert!(mint_token(&config, &args).is_ok());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let args = IssueTokenArgs {
            user_id: UserId::new(1),
            role: Role::User,
            expires_in: None,
        };
        assert!(mint_token(&WardrobeConfig::default(), &args).is_err());
    }
}
