use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use guia_export::brand::BrandMark;
use guia_export::document::DocumentAssembler;
use guia_export::pdf::ChromeEngine;
use guia_export::pipeline::Pipeline;
use guia_export::styles::Theme;
use guia_server::config::{CorsOrigins, ServerConfig};
use guia_server::middleware::rate_limit::RateLimiter;
use guia_server::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ServerConfig::from_env()?;
    if config.cors_origins == CorsOrigins::Any {
        tracing::warn!("CORS allows any origin; set GUIA_CORS_ORIGINS in production");
    }

    // Loaded once; read-only for the life of the process.
    let brand = BrandMark::load(&config.logo_path);

    let assembler = DocumentAssembler::new(Theme::default(), config.print_layout())?;
    let engine = Arc::new(ChromeEngine::new(config.chrome_options()));
    let pipeline = Pipeline::new(assembler, engine, &brand, config.render_timeout)?;
    let limiter = RateLimiter::new(config.rate_limit, config.rate_window);
    tracing::info!(limit = %limiter.describe(), "export rate limit configured");

    let app = guia_server::router(AppState::new(pipeline, limiter), &config)?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
