use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::StatusError;
use crate::domain::{JobId, OwnerId};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct DeleteResponse {
    pub detail: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state))]
pub async fn delete_job_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let uuid = match Uuid::parse_str(&job_id) {
        Ok(u) => u,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid job ID: {}", job_id),
                }),
            )
                .into_response();
        }
    };

    match state.parse_service.delete(JobId::from_uuid(uuid), owner).await {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteResponse {
                detail: "Deleted".to_string(),
            }),
        )
            .into_response(),
        Err(StatusError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Job not found: {}", job_id),
            }),
        )
            .into_response(),
        Err(StatusError::Repository(e)) => {
            tracing::error!(error = %e, "Failed to delete job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to delete job".to_string(),
                }),
            )
                .into_response()
        }
    }
}
