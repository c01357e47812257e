use std::sync::Arc;

use guia_export::pipeline::Pipeline;

use crate::middleware::rate_limit::RateLimiter;

/// Shared application state, injected into all route handlers via Axum state.
///
/// Nothing in here is mutated by handlers; the limiter guards its own
/// counters.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, limiter: RateLimiter) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            limiter: Arc::new(limiter),
        }
    }
}
