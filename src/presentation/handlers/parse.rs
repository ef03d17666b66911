use axum::Json;
use axum::extract::{Extension, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::ports::{ExtractOptions, SpeedHint};
use crate::application::services::SubmitError;
use crate::domain::OwnerId;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseQuery {
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub use_vision: Option<bool>,
}

#[derive(Serialize)]
pub struct ParseResponse {
    pub job_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn parse_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<ParseQuery>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let speed = match query.speed.as_deref() {
        None => SpeedHint::default(),
        Some(raw) => match raw.parse() {
            Ok(s) => s,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Invalid speed hint: {}", raw),
                    }),
                )
                    .into_response();
            }
        },
    };
    let options = ExtractOptions {
        speed,
        use_vision: query.use_vision.unwrap_or(false),
    };

    let field = match multipart.next_field().await {
        Ok(Some(f)) => f,
        Ok(None) => {
            tracing::warn!("Parse request with no file");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "No file uploaded".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read multipart: {}", e),
                }),
            )
                .into_response();
        }
    };

    let filename = field.file_name().unwrap_or("unknown").to_string();
    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read file bytes");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read file: {}", e),
                }),
            )
                .into_response();
        }
    };

    tracing::debug!(filename = %filename, bytes = data.len(), "Processing file upload");

    match state
        .parse_service
        .submit(filename, data.to_vec(), owner, options)
        .await
    {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(ParseResponse {
                job_id: job_id.as_uuid().to_string(),
                status: "pending".to_string(),
                message: "File queued for processing".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            let status = match &e {
                SubmitError::EmptyFile => StatusCode::BAD_REQUEST,
                SubmitError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                SubmitError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                SubmitError::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
                SubmitError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(error = %e, "Submit failed");
            } else {
                tracing::warn!(error = %e, "Upload rejected");
            }
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
