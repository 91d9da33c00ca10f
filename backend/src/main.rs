use anyhow::Context;
use care_tracker_backend::{config::AppConfig, create_router, initialize_backend, logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config.server)?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Care tracker listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
