// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgreSQL connection pool wrapper.
//!
//! Typed operations live in the sibling modules:
//! - `users` (registration, lookup, profile updates)
//! - `tokens` (digest rows for bearer tokens)
//! - `workouts` (transactional workout aggregates)

use crate::config::Config;
use crate::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Database handle shared by every request.
#[derive(Clone)]
pub struct Database {
    pool: Option<PgPool>,
}

impl Database {
    /// Connect to PostgreSQL using the pool limits from `config`.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.database_acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self { pool: Some(pool) })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a mock database for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { pool: None }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(self.pool()?)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Helper to get the pool or return an error if offline.
    pub(crate) fn pool(&self) -> Result<&PgPool, AppError> {
        self.pool
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}
