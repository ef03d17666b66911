use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::auth::auth_middleware;
use crate::presentation::handlers::{
    delete_job_handler, health_handler, history_handler, issue_token_handler, job_status_handler,
    parse_handler, stream_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Leave headroom over the upload ceiling so oversized files reach the
    // validation path and get a proper 413 instead of a transport error.
    let body_limit =
        DefaultBodyLimit::max(((state.settings.upload.max_file_size_mb + 1) * 1024 * 1024) as usize);

    let protected = Router::new()
        .route("/api/v1/parse", post(parse_handler))
        .route("/api/v1/parse/status/{job_id}", get(job_status_handler))
        .route("/api/v1/parse/history", get(history_handler))
        .route("/api/v1/parse/{job_id}", delete(delete_job_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/auth/token", post(issue_token_handler))
        // Token arrives as a query param here; the handler verifies it
        // itself instead of the bearer middleware.
        .route("/api/v1/parse/stream/{job_id}", get(stream_handler))
        .merge(protected)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .layer(body_limit)
        .with_state(state)
}
