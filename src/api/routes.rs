use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::service::LinkService;

use super::handlers::{get_stats, health_check, shorten_url, AppState};

pub fn create_api_router(service: LinkService, base_url: &str) -> Router {
    let state = Arc::new(AppState {
        service,
        base_url: base_url.trim_end_matches('/').to_string(),
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/shorten", post(shorten_url))
        .route("/stats/{code}", get(get_stats))
        .with_state(state)
}
