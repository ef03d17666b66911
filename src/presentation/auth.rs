use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Resolves the bearer credential to an `OwnerId` request extension.
/// Everything behind this middleware can trust that identity for ownership
/// checks; nothing else about the caller is known or needed.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let owner = match token.map(|t| state.authenticator.verify(t)) {
        Some(Ok(owner)) => owner,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return unauthorized();
        }
        None => return unauthorized(),
    };

    request.extensions_mut().insert(owner);
    next.run(request).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Missing or invalid bearer token".to_string(),
        }),
    )
        .into_response()
}
