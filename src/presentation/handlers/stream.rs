use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Job, JobEvent, JobId, JobStatus};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct StreamQuery {
    /// EventSource cannot set headers, so the bearer token rides in the
    /// query string.
    pub token: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, query))]
pub async fn stream_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<StreamQuery>,
) -> Response {
    let owner = match state.authenticator.verify(&query.token) {
        Ok(owner) => owner,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected stream token");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Missing or invalid bearer token".to_string(),
                }),
            )
                .into_response();
        }
    };

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
    let job_id = JobId::from_uuid(uuid);

    // Subscribe before reading the snapshot: a terminal transition landing
    // in between is then visible on one side or the other, never missed.
    let subscription = state.notifier.subscribe(job_id);

    let job = match state.job_repository.get_for_owner(job_id, owner).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Job not found: {}", job_id.as_uuid()),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job for streaming");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch job".to_string(),
                }),
            )
                .into_response();
        }
    };

    let keep_alive = Duration::from_secs(state.settings.stream.keep_alive_seconds);
    let max_duration = Duration::from_secs(state.settings.stream.max_stream_seconds);

    let sse_stream = async_stream::stream! {
        if job.status.is_terminal() {
            yield Ok::<_, Infallible>(terminal_event(&job));
            return;
        }

        let Some(mut subscription) = subscription else {
            // Live channel already gone but the snapshot is not terminal:
            // the transition is committing right now. Tell the client to
            // fall back to polling.
            yield Ok(named_event("error_event", &serde_json::json!({
                "message": "Live updates unavailable, poll job status"
            })));
            return;
        };

        let deadline = tokio::time::sleep(max_duration);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    yield Ok(named_event("error_event", &serde_json::json!({
                        "message": "Stream timeout"
                    })));
                    break;
                }
                event = subscription.events.next() => {
                    match event {
                        Some(event) => {
                            let terminal = event.is_terminal();
                            yield Ok(job_event(&event));
                            if terminal {
                                break;
                            }
                        }
                        None => {
                            yield Ok(named_event("error_event", &serde_json::json!({
                                "message": "Stream interrupted, poll job status"
                            })));
                            break;
                        }
                    }
                }
            }
        }
    };

    Sse::new(sse_stream)
        .keep_alive(
            KeepAlive::new()
                .interval(keep_alive)
                .text("keepalive"),
        )
        .into_response()
}

fn job_event(event: &JobEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_default();
    Event::default().event(event.name()).data(data)
}

fn named_event(name: &str, payload: &serde_json::Value) -> Event {
    let data = serde_json::to_string(payload).unwrap_or_default();
    Event::default().event(name).data(data)
}

/// Terminal replay for a job that finished before the client subscribed;
/// the payload matches what the status endpoint reports.
fn terminal_event(job: &Job) -> Event {
    match job.status {
        JobStatus::Completed => named_event(
            "complete",
            &serde_json::json!({
                "questions": job.result.clone().unwrap_or_default()
            }),
        ),
        _ => named_event(
            "error_event",
            &serde_json::json!({
                "message": job
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Failed".to_string())
            }),
        ),
    }
}
