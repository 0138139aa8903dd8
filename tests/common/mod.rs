// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use partiu_fit::config::Config;
use partiu_fit::db::Database;
use partiu_fit::models::{NewUser, User};
use partiu_fit::routes::create_router;
use partiu_fit::services::password::hash_password;
use partiu_fit::AppState;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;

/// Password given to every user made by [`create_test_user`].
#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "pa55word";

/// Check if a PostgreSQL instance is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Skip test with message if no database is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("⚠️  Skipping: DATABASE_URL not set");
            return;
        }
    };
}

/// Config pointing at the test database.
#[allow(dead_code)]
pub fn test_config() -> Config {
    let mut config = Config::default();
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }
    config
}

/// Raw pool on the test database, for fixtures the API cannot create.
#[allow(dead_code)]
pub async fn test_pool() -> PgPool {
    let config = test_config();
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to PostgreSQL")
}

/// Connect to the test database and apply migrations.
#[allow(dead_code)]
pub async fn test_db() -> Database {
    let db = Database::from_pool(test_pool().await);
    db.migrate().await.expect("Failed to apply migrations");
    db
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> Database {
    Database::new_mock()
}

/// Create a test app with the offline database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(test_config(), test_db_offline()));
    (create_router(state.clone()), state)
}

/// Create a test app backed by the real database.
#[allow(dead_code)]
pub async fn create_db_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(test_config(), test_db().await));
    (create_router(state.clone()), state)
}

/// Suffix that keeps usernames and emails unique across test runs.
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{:x}", nanos)
}

/// Insert a user whose password is [`TEST_PASSWORD`].
#[allow(dead_code)]
pub async fn create_test_user(db: &Database) -> User {
    let suffix = unique_suffix();
    db.create_user(&NewUser {
        name: "Test User".to_string(),
        username: format!("user_{}", suffix),
        email: format!("user_{}@example.com", suffix),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
    })
    .await
    .expect("Failed to create test user")
}
