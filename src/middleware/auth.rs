// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication.
//!
//! Two stages, applied as separate layers:
//!
//! 1. [`authenticate`] runs on every route. It resolves the
//!    `Authorization: Bearer <token>` header into a [`Principal`] and stores it
//!    in the request extensions. No header resolves to
//!    [`Principal::Anonymous`]; a malformed header or a token that does not
//!    validate ends the request with 401.
//! 2. [`require_user`] runs on protected routes and rejects anonymous
//!    principals with 401.
//!
//! Handlers receive the identity through the [`Principal`] or [`AuthUser`]
//! extractors. Both depend on `authenticate` having run: extracting either on
//! a route outside that layer is a wiring bug and fails the request with 500
//! instead of silently treating the caller as anonymous.

use crate::error::AppError;
use crate::models::{Principal, User, SCOPE_AUTHENTICATION};
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

const BEARER_SCHEME: &str = "Bearer";

/// Authenticated user extracted from a registered [`Principal`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Extract the token from an `Authorization` header value.
///
/// `Ok(None)` when the header is absent. Anything other than exactly
/// `Bearer <token>` is [`AppError::Unauthorized`].
pub fn parse_bearer(value: Option<&HeaderValue>) -> Result<Option<&str>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AppError::Unauthorized)?;
    let parts: Vec<&str> = value.split(' ').collect();

    match parts.as_slice() {
        [scheme, token] if *scheme == BEARER_SCHEME && !token.is_empty() => Ok(Some(token)),
        _ => Err(AppError::Unauthorized),
    }
}

/// Resolve stage: attach the caller's [`Principal`] to the request.
///
/// Every response passing through here, rejections included, carries
/// `Vary: Authorization`.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = resolve_principal(&state, request.headers()).await;

    let mut response = match resolved {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    };

    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn resolve_principal(state: &AppState, headers: &HeaderMap) -> Result<Principal, AppError> {
    let token = parse_bearer(headers.get(header::AUTHORIZATION))
        .inspect_err(|_| tracing::debug!("Rejected malformed Authorization header"))?;

    let Some(token) = token else {
        return Ok(Principal::Anonymous);
    };

    let principal = state
        .tokens
        .validate(SCOPE_AUTHENTICATION, token)
        .await
        .inspect_err(|err| {
            if matches!(err, AppError::InvalidCredentials) {
                tracing::debug!("Rejected invalid or expired token");
            }
        })?;

    if let Some(user) = principal.user() {
        tracing::debug!(user_id = user.id, "Request authenticated");
    }

    Ok(principal)
}

/// Require stage: only registered principals continue.
pub async fn require_user(
    principal: Principal,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if principal.is_anonymous() {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Principal>().cloned().ok_or_else(|| {
            tracing::error!(path = %parts.uri.path(), "Identity read before authenticate ran");
            AppError::Internal(anyhow::anyhow!(
                "request identity not resolved; authenticate layer missing"
            ))
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Principal::from_request_parts(parts, state).await? {
            Principal::Registered(user) => Ok(AuthUser(user)),
            Principal::Anonymous => Err(AppError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &'static str) -> HeaderValue {
        HeaderValue::from_static(value)
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert_eq!(parse_bearer(None).unwrap(), None);
    }

    #[test]
    fn test_well_formed_bearer() {
        let value = header("Bearer abc123");
        assert_eq!(parse_bearer(Some(&value)).unwrap(), Some("abc123"));
    }

    #[test]
    fn test_malformed_headers_are_unauthorized() {
        for raw in [
            "Basic abc123",
            "bearer abc123",
            "Bearer",
            "Bearer ",
            "Bearer abc 123",
            "abc123",
            "",
        ] {
            let value = header(raw);
            assert!(
                matches!(parse_bearer(Some(&value)), Err(AppError::Unauthorized)),
                "expected {raw:?} to be rejected"
            );
        }
    }
}
