// SPDX-License-Identifier: MIT

//! SeePaw API Server
//!
//! Serves animal listings, adoption requests, activity scheduling, and live
//! walk tracking for the SeePaw mobile app.

use seepaw_api::{config::Config, db::FirestoreDb, services::walk::WalkRegistry, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting SeePaw API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Registry of in-flight walk sessions, shared across handlers
    let walks = WalkRegistry::new();
    tracing::info!("Walk registry initialized");

    // Build shared state
    let state = Arc::new(AppState { config, db, walks });

    // Build router
    let app = seepaw_api::routes::create_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seepaw_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
