// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Partiu Fit: workout tracking backend.
//!
//! This crate provides the HTTP API for registering users, issuing bearer
//! tokens and managing workouts with their ordered exercise entries.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Database;
use services::TokenService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let tokens = TokenService::new(db.clone());
        Self { config, db, tokens }
    }
}
