use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
    pub health: String,
    pub transcribe: String,
}

/// Service-running pointer for clients hitting the bare origin.
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "STT Server is running".to_string(),
        health: "/api/v1/health".to_string(),
        transcribe: "/api/v1/transcribe".to_string(),
    })
}
