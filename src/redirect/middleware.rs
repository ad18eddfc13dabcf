use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log how long each redirect took to serve
pub async fn log_redirect_timing(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;
    tracing::debug!(
        path = %path,
        status = response.status().as_u16(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "redirect served"
    );
    response
}
