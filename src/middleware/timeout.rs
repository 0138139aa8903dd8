// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-request deadline.
//!
//! When the deadline passes the downstream future is dropped. Any
//! `sqlx::Transaction` it held is dropped uncommitted and rolled back when
//! its connection returns to the pool.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Abort the request with 504 once `config.request_timeout` elapses.
pub async fn enforce_deadline(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let deadline = state.config.request_timeout;
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(
                %method,
                path,
                timeout_ms = deadline.as_millis() as u64,
                "Request deadline exceeded, abandoning"
            );
            AppError::Timeout.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Database;
    use axum::body::Body;
    use axum::http::{self, StatusCode};
    use axum::{routing::get, Router};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(timeout: Duration) -> Router {
        let config = Config {
            request_timeout: timeout,
            ..Config::default()
        };
        let state = Arc::new(AppState::new(config, Database::new_mock()));

        Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                enforce_deadline,
            ))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let response = app(Duration::from_millis(20))
            .oneshot(http::Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_fast_request_passes_through() {
        let response = app(Duration::from_secs(5))
            .oneshot(http::Request::builder().uri("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
