use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::{StagingStore, TranscriptionEngine};
use crate::presentation::handlers::SERVICE_NAME;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub service: String,
}

pub async fn health_handler<E, S>(State(state): State<AppState<E, S>>) -> impl IntoResponse
where
    E: TranscriptionEngine + 'static,
    S: StagingStore + 'static,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.transcription_service.is_ready(),
        service: SERVICE_NAME.to_string(),
    })
}
