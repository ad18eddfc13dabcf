use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use nanolink::config::Config;
use nanolink::{create_app, storage, LinkService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nanolink=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let store = storage::connect(&config.database, &config.cache)
        .await
        .context("failed to initialize storage")?;
    info!("Storage initialized successfully");

    let service = LinkService::with_offset(store.clone(), config.code_offset);
    let app = create_app(service, &config.base_url);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 NanoLink listening on http://{}", addr);
    info!("   - Short links served as {}/<code>", config.base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing storage");
    store.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
