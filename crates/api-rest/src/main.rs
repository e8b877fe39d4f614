//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the BioTrack REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging of the HTTP surface. The workspace's main
//! `biotrack-run` binary serves the same router after loading a `.env` file.

use std::sync::Arc;

use api_rest::{router, AppState};
use biotrack_core::config::{
    data_file_from_env_value, grouping_from_env_value, zoom_from_env_value,
};
use biotrack_core::CoreConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the BioTrack REST API server.
///
/// # Environment Variables
/// - `BIOTRACK_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `BIOTRACK_DATA_FILE`: Treatment store file (default: "biotrack_data/treatments.json")
/// - `BIOTRACK_DEFAULT_ZOOM`: `day`, `week` or `month` (default: "week")
/// - `BIOTRACK_TRACK_GROUPING`: `exact` or `normalised` (default: "exact")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("biotrack_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("BIOTRACK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::new(
        data_file_from_env_value(std::env::var("BIOTRACK_DATA_FILE").ok()),
        zoom_from_env_value(std::env::var("BIOTRACK_DEFAULT_ZOOM").ok())?,
        grouping_from_env_value(std::env::var("BIOTRACK_TRACK_GROUPING").ok())?,
    )?);

    tracing::info!(
        "-- Starting BioTrack REST API on {} (store: {})",
        addr,
        cfg.data_file().display()
    );

    let app = router(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
