use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::{StagingStore, TranscriptionEngine};
use crate::presentation::handlers::SERVICE_NAME;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ServiceInfoResponse {
    pub service: String,
    pub version: String,
    pub model: String,
    pub device: String,
    pub supported_formats: Vec<String>,
    pub max_file_size_mb: u64,
}

pub async fn info_handler<E, S>(State(state): State<AppState<E, S>>) -> impl IntoResponse
where
    E: TranscriptionEngine + 'static,
    S: StagingStore + 'static,
{
    Json(ServiceInfoResponse {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.settings.whisper.model.clone(),
        device: state.settings.whisper.device.clone(),
        supported_formats: state.settings.upload.allowed_extensions.clone(),
        max_file_size_mb: state.settings.upload.max_file_size / (1024 * 1024),
    })
}
