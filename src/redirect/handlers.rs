use axum::{
    extract::{Path, State},
    http::{header::HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::api::handlers::ApiError;
use crate::service::LinkService;

pub struct RedirectState {
    pub service: LinkService,
}

/// Redirect to original URL, counting the click
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
) -> Response {
    let resolution = match state.service.resolve(&code).await {
        Ok(resolution) => resolution,
        Err(e) => return ApiError(e).into_response(),
    };

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        "x-nanolink-cache-hit",
        HeaderValue::from_static(if resolution.cache_hit { "true" } else { "false" }),
    );

    // Temporary, so browsers come back through us and every click is counted
    (response_headers, Redirect::temporary(&resolution.original_url)).into_response()
}
