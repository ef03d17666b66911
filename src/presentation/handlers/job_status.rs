use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::StatusError;
use crate::domain::{Job, JobId, OwnerId, Question};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub filename: String,
    pub status: String,
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobStatusResponse {
    pub fn from_job(job: Job) -> Self {
        Self {
            job_id: job.id.as_uuid().to_string(),
            filename: job.filename,
            status: job.status.as_str().to_string(),
            progress_percent: job.progress_percent,
            message: job.progress_message,
            questions: job.result,
            error_message: job.error_message,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
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

    match state
        .parse_service
        .get_status(JobId::from_uuid(uuid), owner)
        .await
    {
        Ok(job) => (StatusCode::OK, Json(JobStatusResponse::from_job(job))).into_response(),
        Err(StatusError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Job not found: {}", job_id),
            }),
        )
            .into_response(),
        Err(StatusError::Repository(e)) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch job".to_string(),
                }),
            )
                .into_response()
        }
    }
}
