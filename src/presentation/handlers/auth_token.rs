use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::domain::OwnerId;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub owner_id: String,
    pub expires_at: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Mints a fresh anonymous owner identity. Jobs submitted with this token
/// are visible to it alone.
#[tracing::instrument(skip(state))]
pub async fn issue_token_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.authenticator.issue(OwnerId::new()) {
        Ok(issued) => (
            StatusCode::OK,
            Json(TokenResponse {
                token: issued.token,
                owner_id: issued.owner.as_uuid().to_string(),
                expires_at: issued.expires_at.to_rfc3339(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue token");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to issue token".to_string(),
                }),
            )
                .into_response()
        }
    }
}
