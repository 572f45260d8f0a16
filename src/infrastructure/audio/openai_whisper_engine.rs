use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{EngineError, EngineOutput, TranscriptionEngine};
use crate::domain::TranscriptionSegment;

/// Whisper engine speaking the OpenAI-compatible `/audio/transcriptions`
/// protocol. Readiness is flipped once by `load()`, mirroring the
/// load-once model lifecycle; until then `transcribe` is refused upstream.
pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    ready: AtomicBool,
}

fn default_probability() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct VerboseTranscription {
    text: String,
    language: String,
    #[serde(default)]
    duration: f64,
    // faster-whisper-compatible servers report this; the stock OpenAI API
    // does not, so default to full confidence.
    #[serde(default = "default_probability")]
    language_probability: f32,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    text: String,
    #[serde(default)]
    confidence: Option<f32>,
}

impl OpenAiWhisperEngine {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: model.unwrap_or_else(|| "whisper-1".to_string()),
            ready: AtomicBool::new(false),
        }
    }

    /// One-time initialization: probe the endpoint and mark the engine
    /// ready. Called before the server starts accepting requests.
    pub async fn load(&self) -> Result<(), EngineError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| EngineError::ModelLoadFailed(format!("endpoint unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(EngineError::ModelLoadFailed(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        self.ready.store(true, Ordering::Release);
        tracing::info!(model = %self.model, "whisper engine ready");
        Ok(())
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<EngineOutput, EngineError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let audio_data = tokio::fs::read(audio_path)
            .await
            .map_err(|e| EngineError::ApiRequestFailed(format!("read staged audio: {}", e)))?;
        let filename = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let file_part = multipart::Part::bytes(audio_data).file_name(filename);
        let mut form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", file_part);
        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        tracing::debug!(model = %self.model, language = ?language, "sending audio to whisper endpoint");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| EngineError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(EngineError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let segments: Vec<TranscriptionSegment> = if parsed.segments.is_empty() {
            // Some servers omit segments for very short audio; synthesize a
            // single span covering the whole clip.
            if parsed.text.trim().is_empty() {
                Vec::new()
            } else {
                vec![TranscriptionSegment {
                    start: 0.0,
                    end: parsed.duration,
                    text: parsed.text.trim().to_string(),
                    confidence: None,
                }]
            }
        } else {
            parsed
                .segments
                .into_iter()
                .map(|s| TranscriptionSegment {
                    start: s.start,
                    end: s.end,
                    text: s.text.trim().to_string(),
                    confidence: s.confidence,
                })
                .collect()
        };

        tracing::info!(
            language = %parsed.language,
            segments = segments.len(),
            "whisper transcription completed"
        );

        Ok(EngineOutput {
            segments,
            language: parsed.language,
            language_probability: parsed.language_probability,
        })
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
