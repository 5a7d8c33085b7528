// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.
//!
//! Validation failures must short-circuit before any store access, so
//! all of these run against the offline mock database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_register_missing_fields() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/users/register",
            serde_json::json!({ "user_name": "alice" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/users/register",
            serde_json::json!({
                "user_name": "alice",
                "email": "not-an-email",
                "password": "s3cret-enough",
                "full_name": "Alice",
                "avatar": "/tmp/avatar.png"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_missing_password() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/users/login",
            serde_json::json!({ "email": "a@x.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_refresh_without_token_anywhere() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json("/api/users/refresh-token", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_garbage_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/users/refresh-token",
            serde_json::json!({ "refresh_token": "garbage.token.value" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_accepts_token_from_cookie() {
    let (app, state) = common::create_test_app();
    let refresh = state.tokens.issue_refresh("user-1").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users/refresh-token")
                .header(header::COOKIE, format!("refreshToken={}", refresh))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Token passes verification, then the user lookup hits the offline
    // mock db: 500, not 401 - proving the cookie transport was read.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_change_password_mismatched_confirmation() {
    let (app, state) = common::create_test_app();
    let token = state.tokens.issue_access("user-1").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users/change-password")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "old_password": "old-one",
                        "new_password": "new-one",
                        "confirm_password": "different"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // Auth middleware resolves the user first; with the offline db that
    // fails before validation can run.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_failure_envelope_shape() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json("/api/users/login", serde_json::json!({})))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
    assert!(body.get("data").is_none());
}
