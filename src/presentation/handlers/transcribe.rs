use std::io;

use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_LENGTH;
use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::application::ports::{StagingStore, TranscriptionEngine};
use crate::application::services::{TranscribeError, Upload};
use crate::domain::{TranscriptionResult, UploadDescriptor};
use crate::presentation::handlers::error::ApiError;
use crate::presentation::state::AppState;

// Room for multipart boundaries and part headers on top of the file itself.
pub const MULTIPART_OVERHEAD: usize = 4 * 1024;

#[derive(Debug, Deserialize)]
pub struct TranscribeParams {
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
    pub language: String,
    pub language_probability: f32,
    pub segments_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<SegmentResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfoResponse>,
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct FileInfoResponse {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Accepts a multipart upload (`file` field, optional `language` text field
/// or query parameter) and runs it through the transcription pipeline. The
/// file bytes stream straight into staging without buffering the whole
/// upload in memory.
#[tracing::instrument(skip(state, headers, multipart))]
pub async fn transcribe_handler<E, S>(
    State(state): State<AppState<E, S>>,
    Query(params): Query<TranscribeParams>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ApiError>
where
    E: TranscriptionEngine + 'static,
    S: StagingStore + 'static,
{
    // Query parameter takes precedence over a form field.
    let mut language = params.language.filter(|l| !l.is_empty());

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => {
                tracing::warn!("transcription request without a file field");
                return state
                    .transcription_service
                    .process(None, language.as_deref())
                    .await
                    .map(|result| Json(to_response(result)))
                    .map_err(ApiError);
            }
            Err(e) => {
                return Err(ApiError(TranscribeError::Internal(format!(
                    "failed to read multipart body: {}",
                    e
                ))));
            }
        };

        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "language" => {
                if language.is_none() {
                    language = field.text().await.ok().filter(|l| !l.is_empty());
                }
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                // Parts rarely carry their own Content-Length, so fall back to
                // the request body size minus the multipart framing. Either
                // way the validator sees an upper bound on the file size
                // before a single byte of it is streamed.
                let declared_size = content_length(field.headers()).or_else(|| {
                    content_length(&headers).map(|n| n.saturating_sub(MULTIPART_OVERHEAD as u64))
                });

                tracing::info!(filename = %filename, language = ?language, "received transcription request");

                let descriptor = UploadDescriptor::new(filename, content_type, declared_size);
                let stream = field.map_err(io::Error::other).boxed();

                let result = state
                    .transcription_service
                    .process(Some(Upload { descriptor, stream }), language.as_deref())
                    .await
                    .map_err(ApiError)?;

                return Ok(Json(to_response(result)));
            }
            _ => {}
        }
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn to_response(result: TranscriptionResult) -> TranscriptionResponse {
    let TranscriptionResult {
        text,
        language,
        language_probability,
        segments,
        processing_time,
        file_info,
    } = result;

    let segments: Vec<SegmentResponse> = segments
        .into_iter()
        .map(|s| SegmentResponse {
            start: s.start,
            end: s.end,
            text: s.text,
            confidence: s.confidence,
        })
        .collect();

    TranscriptionResponse {
        text,
        language,
        language_probability,
        segments_count: segments.len(),
        segments: Some(segments),
        processing_time: Some(processing_time),
        file_info: Some(FileInfoResponse {
            filename: file_info.filename,
            content_type: file_info.content_type,
            size_bytes: file_info.declared_size,
        }),
    }
}
