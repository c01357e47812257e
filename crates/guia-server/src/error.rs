use std::time::Duration;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use guia_export::error::ExportError;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be read as an export request.
    Validation { status: StatusCode, message: String },
    RateLimited { description: String, retry_after: Duration },
    /// Any rendering failure. The message is returned to the caller as-is.
    Render(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { status, message } => {
                (status, Json(ErrorBody { detail: message })).into_response()
            }
            ApiError::RateLimited {
                description,
                retry_after,
            } => {
                // Round up so clients never retry inside the current window.
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorBody {
                        detail: format!("Rate limit exceeded: {description}"),
                    }),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                response
            }
            ApiError::Render(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { detail: message }),
            )
                .into_response(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        tracing::error!(error = ?e, "error generating PDF");
        ApiError::Render(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
