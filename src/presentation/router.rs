use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{StagingStore, TranscriptionEngine};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    MULTIPART_OVERHEAD, health_handler, info_handler, root_handler, transcribe_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<E, S>(state: AppState<E, S>) -> Router
where
    E: TranscriptionEngine + 'static,
    S: StagingStore + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit =
        DefaultBodyLimit::max(state.settings.upload.max_file_size as usize + MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler::<E, S>))
        .route("/api/v1/health", get(health_handler::<E, S>))
        .route("/api/v1/info", get(info_handler::<E, S>))
        .route("/transcribe", post(transcribe_handler::<E, S>))
        .route("/api/v1/transcribe", post(transcribe_handler::<E, S>))
        .layer(body_limit)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
