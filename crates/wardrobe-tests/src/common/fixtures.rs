// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures

use wardrobe_core::NewItem;

/// Signing secret shared by every harness.
pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// Password used for every fixture account.
pub const TEST_PASSWORD: &str = "s3cret-passw0rd";

/// Catalog items.
pub struct ItemFixtures;

impl ItemFixtures {
    /// A jacket with the given price and stock.
    pub fn jacket(price: i64, stock: u32) -> NewItem {
        NewItem {
            category: "jacket".to_string(),
            size: "M".to_string(),
            price,
            sex: "unisex".to_string(),
            image_id: None,
            brand_id: 1,
            stock,
        }
    }

    /// A scarf, used when a second distinct line is needed.
    pub fn scarf(price: i64, stock: u32) -> NewItem {
        NewItem {
            category: "scarf".to_string(),
            size: "one-size".to_string(),
            price,
            sex: "female".to_string(),
            image_id: Some(12),
            brand_id: 2,
            stock,
        }
    }
}

/// Configuration documents.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// A complete YAML document for the memory backend.
    pub fn yaml() -> String {
        format!(
            r#"
server:
  host: 127.0.0.1
  port: 18080
  base_path: /api/v1
  request_timeout_secs: 5

jwt:
  secret: {TEST_SECRET}
  expiration_secs: 3600
  revocation: true

store:
  backend: memory

bootstrap:
  admin:
    login: shop-admin
    password: {TEST_PASSWORD}
    name: Shop Admin

logging:
  level: debug
  format: compact
"#
        )
    }

    /// The same settings as TOML.
    pub fn toml() -> String {
        format!(
            r#"
[server]
host = "127.0.0.1"
port = 18080
base_path = "/api/v1"

[jwt]
secret = "{TEST_SECRET}"
revocation = true

[store]
backend = "memory"
"#
        )
    }
}
