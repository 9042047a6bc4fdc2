//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging against the REST surface alone (with
//! OpenAPI/Swagger UI). The workspace's main `wardview-run` binary serves the
//! same router after loading a `.env` file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// # Environment Variables
/// - `WARDVIEW_REST_ADDR`: listen address (default: "0.0.0.0:3000")
/// - `WARDVIEW_DATA_DIR`, `WARDVIEW_BLOB_DIR`, `WARDVIEW_SEED_DEMO`: see [`api_rest::config_from_env`]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("wardview_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("WARDVIEW_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = api_rest::config_from_env()?;
    tracing::info!(
        "-- Starting Wardview REST API on {} (data: {})",
        addr,
        cfg.data_dir().display()
    );

    let state = api_rest::state_from_config(&cfg)?;
    let app = api_rest::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
