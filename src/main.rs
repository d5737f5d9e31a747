// repolang - GitHub repository search proxy.
// Entry point: logging, configuration and the HTTP server.

use tracing_subscriber::EnvFilter;

use repolang::api;
use repolang::config::Config;
use repolang::github::ApiVersion;
use repolang::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    if let Err(e) = config.api_version.parse::<ApiVersion>() {
        tracing::warn!("{e}; search requests will answer 503");
    }
    tracing::info!("GitHub API version: {}", config.api_version);
    tracing::info!(
        "Cache: {:?}, ttl {}s",
        config.cache_backend,
        config.cache_ttl.as_secs()
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config)?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
