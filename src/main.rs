use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for Wardview
///
/// Loads `.env`, resolves the core configuration and serves the REST API.
///
/// # Environment Variables
/// - `WARDVIEW_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `WARDVIEW_DATA_DIR`: collection directory (default: "ward_data")
/// - `WARDVIEW_BLOB_DIR`: attachment directory (default: "<data dir>/files")
/// - `WARDVIEW_SEED_DEMO`: seed never-initialised collections (default: true)
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
                .add_directive("wardview_run=info".parse()?)
                .add_directive("wardview_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("WARDVIEW_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = api_rest::config_from_env()?;
    let state = api_rest::state_from_config(&cfg)?;

    tracing::info!("++ Starting Wardview REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::router(state)).await?;

    Ok(())
}
