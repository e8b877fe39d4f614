use std::sync::Arc;

use api_rest::{AppState, router};
use biotrack_core::CoreConfig;
use biotrack_core::config::{
    data_file_from_env_value, grouping_from_env_value, zoom_from_env_value,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the BioTrack application
///
/// Loads `.env`, resolves the configuration once and serves the REST API with its
/// Swagger UI.
///
/// # Environment Variables
/// - `BIOTRACK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `BIOTRACK_DATA_FILE`: Treatment store file (default: "biotrack_data/treatments.json")
/// - `BIOTRACK_DEFAULT_ZOOM`: Default axis zoom (default: "week")
/// - `BIOTRACK_TRACK_GROUPING`: `exact` or `normalised` (default: "exact")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("biotrack_run=info".parse()?)
                .add_directive("biotrack_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("BIOTRACK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::new(
        data_file_from_env_value(std::env::var("BIOTRACK_DATA_FILE").ok()),
        zoom_from_env_value(std::env::var("BIOTRACK_DEFAULT_ZOOM").ok())?,
        grouping_from_env_value(std::env::var("BIOTRACK_TRACK_GROUPING").ok())?,
    )?);

    tracing::info!("++ Starting BioTrack REST on {}", rest_addr);
    tracing::info!(
        data_file = %cfg.data_file().display(),
        zoom = %cfg.default_zoom(),
        grouping = ?cfg.track_grouping(),
        "configuration resolved"
    );

    let app = router(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
