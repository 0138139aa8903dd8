// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication token issuance and revocation.

use super::extract::ValidatedJson;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{Token, SCOPE_AUTHENTICATION};
use crate::services::password::{spawn_verify, DUMMY_PASSWORD_HASH};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Login (public).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/tokens/authentication", post(create_authentication_token))
}

/// Logout everywhere (requires a registered user).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/tokens", delete(revoke_tokens))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTokenRequest {
    #[validate(length(min = 1, message = "must be provided"))]
    pub username: String,
    #[validate(length(min = 1, message = "must be provided"))]
    pub password: String,
}

/// Exchange username and password for a bearer token.
///
/// Unknown usernames and wrong passwords fail identically, and both run
/// one Argon2 verification.
async fn create_authentication_token(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateTokenRequest>,
) -> Result<(StatusCode, Json<Token>)> {
    let Some(user) = state.db.get_user_by_username(&req.username).await? else {
        spawn_verify(DUMMY_PASSWORD_HASH.to_string(), req.password).await?;
        tracing::warn!(username = %req.username, "Login for unknown user");
        return Err(AppError::InvalidCredentials);
    };

    if !spawn_verify(user.password_hash.clone(), req.password).await? {
        tracing::warn!(user_id = user.id, "Login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .tokens
        .issue(user.id, state.config.token_ttl, SCOPE_AUTHENTICATION)
        .await?;

    Ok((StatusCode::CREATED, Json(token)))
}

/// Revoke every token belonging to the caller.
async fn revoke_tokens(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode> {
    let revoked = state.tokens.revoke_all(user.id).await?;
    tracing::info!(user_id = user.id, revoked, "Tokens revoked");
    Ok(StatusCode::NO_CONTENT)
}
