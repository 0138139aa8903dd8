// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User registration and profile updates.

use super::extract::ValidatedJson;
use crate::error::Result;
use crate::middleware::{require_user, AuthUser};
use crate::models::{NewUser, User};
use crate::services::password::spawn_hash;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// `POST /users` is public; `PUT /users` needs a registered caller.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/users",
        post(register_user).merge(put(update_user).route_layer(middleware::from_fn(require_user))),
    )
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "must be between 6 and 128 characters"))]
    pub password: String,
}

/// Profile replacement. `password` is optional; supplying it rotates the
/// credential and revokes every outstanding token.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "must be between 6 and 128 characters"))]
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Register a new user.
async fn register_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let password_hash = spawn_hash(req.password).await?;

    let user = state
        .db
        .create_user(&NewUser {
            name: req.name,
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

/// Replace the caller's profile.
async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let Some(password) = req.password else {
        let user = state
            .db
            .update_user(
                current.id,
                &NewUser {
                    name: req.name,
                    username: req.username,
                    email: req.email,
                    password_hash: current.password_hash,
                },
            )
            .await?;

        tracing::info!(user_id = user.id, "User profile updated");
        return Ok(Json(UserResponse { user }));
    };

    let password_hash = spawn_hash(password).await?;
    let (user, revoked) = state
        .db
        .rotate_user_credentials(
            current.id,
            &NewUser {
                name: req.name,
                username: req.username,
                email: req.email,
                password_hash,
            },
        )
        .await?;

    tracing::info!(user_id = user.id, revoked, "Password changed, tokens revoked");

    Ok(Json(UserResponse { user }))
}
