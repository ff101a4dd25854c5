// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Session and Authorization Integration Tests
//!
//! - `test_session_*`: register, login, logout
//! - `test_authz_*`: the role gate in front of each route group
//! - `test_token_*`: what the codec does with bad tokens on the wire

use serde_json::json;

use wardrobe_api::{Claims, JwtConfig, JwtManager};
use wardrobe_core::{Role, Subject, UserId};
use wardrobe_tests::prelude::*;

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_session_register_then_login() {
    let app = TestApp::new();

    let (registered, user_id) = app.shopper("alice").await;
    assert_eq!(app.subject_of(&registered), Subject::new(user_id, Role::User));

    let response = app
        .post(
            "/login",
            None,
            Some(json!({ "login": "alice", "password": TEST_PASSWORD })),
        )
        .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(response.body["token_type"], "Bearer");
    assert_eq!(response.body["expires_in"], 86_400);
    assert_eq!(app.subject_of(&response.token()).id, user_id);
}

#[tokio::test]
async fn test_session_duplicate_login_conflicts() {
    let app = TestApp::new();
    app.shopper("bobby").await;

    let response = app
        .post(
            "/register",
            None,
            Some(json!({ "login": "bobby", "password": "another-password" })),
        )
        .await;
    assert_error(&response, StatusCode::CONFLICT, "CONFLICT");
}

#[tokio::test]
async fn test_session_registration_limits() {
    let app = TestApp::new();

    let response = app
        .post(
            "/register",
            None,
            Some(json!({ "login": "ab", "password": "short" })),
        )
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_session_bad_credentials() {
    let app = TestApp::new();
    app.shopper("carol").await;

    let wrong_password = app
        .post(
            "/login",
            None,
            Some(json!({ "login": "carol", "password": "not-the-password" })),
        )
        .await;
    assert_error(
        &wrong_password,
        StatusCode::UNPROCESSABLE_ENTITY,
        "INVALID_CREDENTIALS",
    );

    let unknown = app
        .post(
            "/login",
            None,
            Some(json!({ "login": "nobody", "password": TEST_PASSWORD })),
        )
        .await;
    assert_error(&unknown, StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CREDENTIALS");
    assert_eq!(wrong_password.body, unknown.body);
}

#[tokio::test]
async fn test_session_logout_revokes_when_enabled() {
    let app = TestApp::with_revocation();
    let (token, _) = app.shopper("dave1").await;
    let item = app.seed_item(100, 5).await;
    let path = format!("/basket/{}", item.id);

    assert_status(&app.post(&path, Some(&token), None).await, StatusCode::OK);
    assert_status(
        &app.post("/logout", Some(&token), None).await,
        StatusCode::NO_CONTENT,
    );

    let after = app.get("/basket", Some(&token)).await;
    assert_error(&after, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");

    // A fresh login is unaffected.
    let relogin = app
        .post(
            "/login",
            None,
            Some(json!({ "login": "dave1", "password": TEST_PASSWORD })),
        )
        .await;
    assert_status(&app.get("/basket", Some(&relogin.token())).await, StatusCode::OK);
}

#[tokio::test]
async fn test_session_logout_without_revocation_is_client_side() {
    let app = TestApp::new();
    let (token, _) = app.shopper("erin1").await;

    assert_status(
        &app.post("/logout", Some(&token), None).await,
        StatusCode::NO_CONTENT,
    );
    assert_ne!(
        app.get("/basket", Some(&token)).await.status,
        StatusCode::UNAUTHORIZED
    );
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_authz_missing_token_is_401() {
    let app = TestApp::new();

    for path in ["/basket", "/orders/my", "/orders"] {
        let response = app.get(path, None).await;
        assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    }
    let response = app
        .request(axum::http::Method::PUT, "/items", None, Some(json!({})))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_authz_user_on_admin_route_is_403() {
    let app = TestApp::new();
    let (token, _) = app.shopper("frank").await;

    let response = app.get("/orders", Some(&token)).await;
    assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");

    let response = app
        .patch("/items/1/stock", Some(&token), json!({ "stock": 3 }))
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");
}

#[tokio::test]
async fn test_authz_admin_passes_both_gates() {
    let app = TestApp::new();
    let admin = app.admin().await;

    assert_status(&app.get("/orders", Some(&admin)).await, StatusCode::OK);
    assert_status(&app.get("/orders/my", Some(&admin)).await, StatusCode::OK);
}

#[tokio::test]
async fn test_authz_public_routes_ignore_tokens() {
    let app = TestApp::new();
    app.seed_item(100, 1).await;

    assert_status(&app.get("/health", None).await, StatusCode::OK);
    assert_status(&app.get("/items", None).await, StatusCode::OK);
    assert_status(&app.get("/items", Some("garbage")).await, StatusCode::OK);
}

// =============================================================================
// Tokens on the wire
// =============================================================================

#[tokio::test]
async fn test_token_expired_is_401() {
    let app = TestApp::new();
    let codec = app.state.jwt();

    let claims = Claims::new(Subject::new(UserId::new(1), Role::Admin), -120)
        .with_issuer(codec.issuer());
    let token = codec.create_token(&claims).unwrap();

    let response = app.get("/orders", Some(&token)).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_token_foreign_secret_is_401() {
    let app = TestApp::new();
    let foreign = JwtManager::new(JwtConfig::new("some-other-secret-that-is-long-enough")).unwrap();
    let token = foreign
        .issue(Subject::new(UserId::new(1), Role::Admin))
        .unwrap();

    let response = app.get("/orders", Some(&token)).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_token_signature_tamper_is_401() {
    let app = TestApp::new();
    let (token, _) = app.shopper("grace").await;

    let (signed, signature) = token.rsplit_once('.').unwrap();
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    let tampered = format!("{}.{}", signed, chars.into_iter().collect::<String>());

    let response = app.get("/basket", Some(&tampered)).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_token_role_escalation_by_splicing_fails() {
    let app = TestApp::new();
    let (user_token, _) = app.shopper("heidi").await;
    let admin_token = app.admin().await;

    // Admin claims under the user's signature.
    let user_parts: Vec<&str> = user_token.split('.').collect();
    let admin_parts: Vec<&str> = admin_token.split('.').collect();
    let spliced = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

    let response = app.get("/orders", Some(&spliced)).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_token_non_bearer_scheme_is_401() {
    let app = TestApp::new();
    let (token, _) = app.shopper("ivan1").await;

    let request = axum::http::Request::get("/basket")
        .header(axum::http::header::AUTHORIZATION, format!("Token {}", token))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}
