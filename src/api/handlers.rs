use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{LinkStats, ShortenRequest, ShortenResponse};
use crate::service::{LinkService, ServiceError};

pub struct AppState {
    pub service: LinkService,
    pub base_url: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Service errors rendered as JSON with a matching status code
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ServiceError::AliasTaken(_) => StatusCode::CONFLICT,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidAlias { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Codec(_)
            | ServiceError::CodeSpaceExhausted(_)
            | ServiceError::CodeAlreadySet { .. }
            | ServiceError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self.0 {
            ServiceError::AliasTaken(_) => "Alias already taken".to_string(),
            ServiceError::NotFound(_) => "URL not found".to_string(),
            ServiceError::InvalidAlias { .. } => self.0.to_string(),
            ref other => {
                tracing::error!(error = %other, "request failed");
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Create a new short link
pub async fn shorten_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShortenRequest>,
) -> Response {
    if payload.url.trim().is_empty() {
        return bad_request("URL cannot be empty");
    }

    match state
        .service
        .shorten(&payload.url, payload.custom_alias.as_deref())
        .await
    {
        Ok(link) => (
            StatusCode::CREATED,
            Json(ShortenResponse {
                short_url: format!("{}/{}", state.base_url, link.short_code),
                short_code: link.short_code,
                original: link.original_url,
            }),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

/// Click statistics for a short link
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<LinkStats>, ApiError> {
    let stats = state.service.get_stats(&code).await?;
    Ok(Json(stats))
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
