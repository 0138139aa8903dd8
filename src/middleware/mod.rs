// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, security, deadlines).

pub mod auth;
pub mod security;
pub mod timeout;

pub use auth::{authenticate, require_user, AuthUser};
