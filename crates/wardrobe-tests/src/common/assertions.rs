// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Assertion Helpers

use axum::http::StatusCode;

use super::harness::TestResponse;

/// Asserts the response status, printing the body on mismatch.
#[track_caller]
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "unexpected status, body: {}",
        response.body
    );
}

/// Asserts an error response with the given status and `error.code`.
#[track_caller]
pub fn assert_error(response: &TestResponse, expected: StatusCode, code: &str) {
    assert_status(response, expected);
    assert_eq!(
        response.error_code(),
        Some(code),
        "unexpected error code, body: {}",
        response.body
    );
}
