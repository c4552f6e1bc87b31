// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use food_delivery_client::gateway::ApiResponse;
use food_delivery_client::{ApiError, FailureKind, LoginError};
use serde_json::{json, Value};

fn login_error_for(status: u16, body: Value) -> LoginError {
    let err = ApiResponse::new(status, body).into_result().unwrap_err();
    LoginError::from(err)
}

#[test]
fn test_login_rejections_map_to_invalid_credentials() {
    let err = login_error_for(401, json!({"detail": "No active account found"}));
    assert!(matches!(err, LoginError::InvalidCredentials));

    let err = login_error_for(400, json!({"non_field_errors": ["Unable to log in"]}));
    assert!(matches!(err, LoginError::InvalidCredentials));
    assert_eq!(err.kind(), FailureKind::Rejected);
}

#[test]
fn test_login_forbidden_is_access_denied() {
    let err = login_error_for(403, json!({"detail": "Account disabled"}));
    assert!(matches!(err, LoginError::RoleMismatch { .. }));
    assert!(err.to_string().starts_with("Access denied"));
}

#[test]
fn test_login_server_fault_is_unexpected() {
    let err = login_error_for(502, Value::Null);
    assert!(matches!(err, LoginError::Unexpected(ref m) if m.contains("502")));
    assert_eq!(err.kind(), FailureKind::Unexpected);
}

#[test]
fn test_undecodable_payload_is_incomplete() {
    let err = ApiResponse::new(200, json!({"unexpected": true}))
        .decode::<food_delivery_client::models::RefreshResponse>()
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
    assert!(matches!(LoginError::from(err), LoginError::IncompleteResponse));
}

#[test]
fn test_other_status_carries_server_message() {
    let err = ApiResponse::new(429, json!({"message": "Slow down"}))
        .into_result()
        .unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert!(err.is_client_error());
    assert_eq!(err.to_string(), "HTTP 429: Slow down");
}
