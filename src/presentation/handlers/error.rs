use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::TranscribeError;

/// Wire shape of every failure: `{error, status_code, type, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status_code: u16,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Boundary adapter turning a classified pipeline error into a response.
#[derive(Debug)]
pub struct ApiError(pub TranscribeError);

impl From<TranscribeError> for ApiError {
    fn from(err: TranscribeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        tracing::error!(kind = self.0.kind(), error = %self.0, "request failed");

        let body = ErrorResponse {
            error: self.0.to_string(),
            status_code: status.as_u16(),
            kind: self.0.kind().to_string(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}
