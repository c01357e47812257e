use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use guia_core::models::request::ExportRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// Render the posted HTML fragment to a PDF attachment.
///
/// Failures are all-or-nothing: either the full PDF is returned or a 500
/// whose `detail` carries the failure description.
pub async fn export_pdf(
    State(state): State<AppState>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    let document = state.pipeline.export(&request).await?;

    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, document.content_disposition()),
        ],
        document.bytes,
    )
        .into_response())
}
