use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::create_api_router;
use crate::redirect::create_redirect_router;
use crate::service::LinkService;

/// The full HTTP surface: API routes, the catch-all redirect route, CORS and
/// request tracing.
pub fn create_app(service: LinkService, base_url: &str) -> Router {
    create_api_router(service.clone(), base_url)
        .merge(create_redirect_router(service))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
