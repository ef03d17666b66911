use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::domain::{Job, OwnerId};
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub items: Vec<HistoryItem>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// List entry without the result payload; clients fetch full results from
/// the status endpoint.
#[derive(Serialize)]
pub struct HistoryItem {
    pub job_id: String,
    pub filename: String,
    pub status: String,
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
}

impl HistoryItem {
    fn from_job(job: Job) -> Self {
        Self {
            job_id: job.id.as_uuid().to_string(),
            filename: job.filename,
            status: job.status.as_str().to_string(),
            progress_percent: job.progress_percent,
            question_count: job.result.as_ref().map(|qs| qs.len()),
            error_message: job.error_message,
            created_at: job.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state))]
pub async fn history_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 100);

    match state.parse_service.history(owner, page, page_size).await {
        Ok(jobs) => (
            StatusCode::OK,
            Json(HistoryResponse {
                items: jobs.items.into_iter().map(HistoryItem::from_job).collect(),
                total: jobs.total,
                page: jobs.page,
                page_size: jobs.page_size,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list jobs");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list jobs".to_string(),
                }),
            )
                .into_response()
        }
    }
}
