use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::service::LinkService;

use super::handlers::{redirect_url, RedirectState};
use super::middleware::log_redirect_timing;

pub fn create_redirect_router(service: LinkService) -> Router {
    let state = Arc::new(RedirectState { service });

    Router::new()
        .route("/{code}", get(redirect_url))
        .layer(middleware::from_fn(log_redirect_timing))
        .with_state(state)
}
