use std::path::Path;

use async_trait::async_trait;

use crate::domain::TranscriptionSegment;

/// What the engine hands back for one audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub segments: Vec<TranscriptionSegment>,
    pub language: String,
    pub language_probability: f32,
}

/// Opaque speech-to-text capability. One-shot, no intermediate progress
/// reporting.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// Transcribe the audio file at `audio_path`. A `language` hint forces
    /// that language; `None` lets the engine auto-detect.
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<EngineOutput, EngineError>;

    /// Whether the one-time engine initialization has completed.
    fn is_ready(&self) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid engine response: {0}")]
    InvalidResponse(String),
    #[error("transcription timed out after {0}s")]
    TimedOut(u64),
}
