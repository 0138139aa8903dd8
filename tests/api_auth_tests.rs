// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication, CORS and request validation tests.
//!
//! These run against the offline database, so they only exercise behaviour
//! decided before any query is made, plus the handling of a store that
//! cannot be reached.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn varies_on_authorization(response: &axum::response::Response) -> bool {
    response
        .headers()
        .get_all(header::VARY)
        .iter()
        .any(|v| v == "Authorization")
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/workouts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(varies_on_authorization(&response));
    let json = body_json(response).await;
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn test_malformed_authorization_headers_are_rejected() {
    for value in ["Bearer", "Bearer ", "Basic dXNlcjpwYXNz", "Bearer a b", "token"] {
        let (app, _) = common::create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/workouts")
                    .header(header::AUTHORIZATION, value)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "header {:?} should be rejected",
            value
        );
        assert!(varies_on_authorization(&response), "header {:?}", value);
    }
}

#[tokio::test]
async fn test_malformed_header_rejected_even_on_public_route() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_failure_is_not_reported_as_bad_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/workouts")
                .header(header::AUTHORIZATION, "Bearer some-opaque-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The offline store cannot answer the lookup; that is a server fault.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(varies_on_authorization(&response));
    let json = body_json(response).await;
    assert_eq!(json["error"], "internal server error");
}

#[tokio::test]
async fn test_authorized_responses_are_not_cached() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/workouts")
                .header(header::AUTHORIZATION, "Bearer x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cache_control.contains("no-store"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/workouts")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_unknown_origin_gets_no_allow_header() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/workouts")
                .header(header::ORIGIN, "https://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_register_validation_lists_every_field() {
    let (app, _) = common::create_test_app();

    let body = serde_json::json!({
        "name": "Alice",
        "username": "al",
        "email": "not-an-email",
        "password": "123"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let errors = json["errors"].as_object().unwrap();
    assert!(errors.contains_key("username"));
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("password"));
    assert!(!errors.contains_key("name"));
}

#[tokio::test]
async fn test_register_with_malformed_json() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Invalid request"));
}

#[tokio::test]
async fn test_update_user_requires_registered_caller() {
    let (app, _) = common::create_test_app();

    let body = serde_json::json!({
        "name": "Alice",
        "username": "alice",
        "email": "alice@example.com"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_workout_lookup_requires_auth() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/workouts/not-a-number")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The require stage runs before the id is even parsed.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_id_assigned_and_propagated() {
    let (app, _) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let assigned = response.headers().get("x-request-id").unwrap();
    assert!(!assigned.is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "client-chosen-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "client-chosen-id"
    );
}
