// SPDX-License-Identifier: MIT

//! Strava-Relay API Server
//!
//! Accepts fitness-activity JSON, converts it to GPX and uploads the result
//! to the authorised Strava account.

use std::sync::Arc;
use strava_relay::{
    config::Config,
    services::{CredentialStore, StravaClient},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Strava-Relay API");

    // Working directories for staged JSON and encoded GPX
    tokio::fs::create_dir_all(config.json_dir()).await?;
    tokio::fs::create_dir_all(config.gpx_dir()).await?;
    tracing::info!(data_dir = %config.data_dir.display(), "Working directories ready");

    let store = CredentialStore::new(&config.data_dir);
    let strava = StravaClient::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        strava,
    });

    // Build router
    let app = strava_relay::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
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
                .add_directive("strava_relay=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
