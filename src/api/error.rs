use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorResponse;
use super::observability::GateRejection;
use crate::clients::UpstreamError;

#[derive(Debug)]
pub enum ApiError {
    ValidationError(String),

    GateRejected { retry_after_secs: u64 },

    Upstream(UpstreamError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::GateRejected { .. } => write!(f, "Too many requests"),
            ApiError::Upstream(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, errors) = match self {
            ApiError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg, None)
            }
            ApiError::GateRejected { retry_after_secs } => {
                let body = ErrorResponse {
                    success: false,
                    error: "too_many_requests",
                    message: "Too many requests. Wait a moment.".to_string(),
                    errors: None,
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response.extensions_mut().insert(GateRejection);
                return response;
            }
            ApiError::Upstream(UpstreamError::RateLimited { status }) => {
                tracing::warn!(upstream_status = status, "Upstream rate limit reached");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "upstream_rate_limited",
                    "Unsplash rate limit reached. Try again later.".to_string(),
                    None,
                )
            }
            ApiError::Upstream(UpstreamError::Api { status, errors }) => {
                tracing::warn!(upstream_status = status, ?errors, "Unsplash API error");
                (
                    StatusCode::BAD_REQUEST,
                    "upstream_error",
                    "Unsplash API Error".to_string(),
                    Some(errors),
                )
            }
            ApiError::Upstream(UpstreamError::Malformed(detail)) => {
                tracing::warn!("Malformed upstream response: {}", detail);
                (
                    StatusCode::BAD_REQUEST,
                    "upstream_malformed",
                    "Unexpected response from Unsplash".to_string(),
                    None,
                )
            }
            ApiError::Upstream(UpstreamError::InvalidRequest(msg)) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg, None)
            }
            ApiError::Upstream(UpstreamError::Transport(err)) => {
                tracing::error!("Upstream request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Failed to fetch from Unsplash".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: code,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }
}
