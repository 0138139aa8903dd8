// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Partiu Fit API Server
//!
//! Lets registered users log workouts made of ordered exercise entries,
//! authenticating with opaque bearer tokens.

use partiu_fit::{config::Config, db::Database, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired token rows are swept.
const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Partiu Fit API");

    // Connect to PostgreSQL and bring the schema up to date
    let db = Database::connect(&config).await?;
    db.migrate().await?;

    spawn_token_sweeper(db.clone());

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db));

    // Build router
    let app = partiu_fit::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Periodically delete tokens whose expiry has passed.
fn spawn_token_sweeper(db: Database) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match db.delete_expired_tokens(chrono::Utc::now()).await {
                Ok(0) => {}
                Ok(deleted) => tracing::info!(deleted, "Expired tokens swept"),
                Err(e) => tracing::warn!(error = %e, "Expired token sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("partiu_fit=debug".parse().expect("valid directive"))
                .add_directive("info".parse().expect("valid directive")),
        )
        .with(format)
        .init();
}
