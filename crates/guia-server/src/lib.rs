//! guia-server
//!
//! HTTP front of the export pipeline: liveness probe, `POST /export`,
//! per-client rate limiting and request logging.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{get, post};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use config::ServerConfig;
use state::AppState;

/// Build the application router.
pub fn router(state: AppState, config: &ServerConfig) -> eyre::Result<Router> {
    let export = Router::new()
        .route("/export", post(routes::export::export_pdf))
        .route_layer(axum_mw::from_fn_with_state(
            state.limiter.clone(),
            middleware::rate_limit::rate_limit,
        ));

    let app = Router::new()
        .route("/", get(routes::health::health_check))
        .merge(export)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(axum_mw::from_fn(middleware::request_log::request_log))
        .layer(config.cors_layer()?)
        .with_state(state);

    Ok(app)
}
