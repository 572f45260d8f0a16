use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::application::ports::{EngineError, StagingError, StagingStore, TranscriptionEngine};
use crate::application::services::file_validator::{FileValidationError, FileValidator};
use crate::domain::{StagingPath, TranscriptionResult, UploadDescriptor};

/// One inbound upload: what the caller declared about it, plus its bytes.
pub struct Upload<'a> {
    pub descriptor: UploadDescriptor,
    pub stream: BoxStream<'a, Result<Bytes, io::Error>>,
}

/// Sequences one transcription request: validate, stage, invoke the engine,
/// assemble the result, and always release the staged file.
pub struct TranscriptionService<E, S>
where
    E: TranscriptionEngine,
    S: StagingStore,
{
    engine: Arc<E>,
    staging: Arc<S>,
    validator: FileValidator,
    default_language: Option<String>,
    engine_timeout: Duration,
}

impl<E, S> TranscriptionService<E, S>
where
    E: TranscriptionEngine,
    S: StagingStore,
{
    pub fn new(
        engine: Arc<E>,
        staging: Arc<S>,
        validator: FileValidator,
        default_language: Option<String>,
        engine_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            staging,
            validator,
            default_language,
            engine_timeout,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    pub async fn process(
        &self,
        upload: Option<Upload<'_>>,
        language_hint: Option<&str>,
    ) -> Result<TranscriptionResult, TranscribeError> {
        let Some(Upload { descriptor, stream }) = upload else {
            return Err(FileValidationError::MissingFile.into());
        };
        self.validator.validate(&descriptor)?;

        if !self.engine.is_ready() {
            return Err(TranscribeError::ModelNotLoaded);
        }

        let staging_path = StagingPath::for_upload(&descriptor.filename);
        let staged = self.staging.stage(&staging_path, stream).await?;
        tracing::debug!(path = %staged.staging_path, bytes = staged.size_bytes, "upload staged");

        let language = language_hint.or(self.default_language.as_deref());
        let started = Instant::now();
        let outcome = match tokio::time::timeout(
            self.engine_timeout,
            self.engine.transcribe(&staged.absolute_path, language),
        )
        .await
        {
            Ok(result) => result.map_err(TranscribeError::Transcription),
            Err(_) => Err(TranscribeError::Transcription(EngineError::TimedOut(
                self.engine_timeout.as_secs(),
            ))),
        };

        // Cleanup runs on every exit path past staging; its own failure is
        // logged and never masks the primary outcome.
        if let Err(e) = self.staging.release(&staged).await {
            tracing::warn!(path = %staged.staging_path, error = %e, "failed to release staged file");
        }

        let output = outcome?;
        let processing_time = started.elapsed().as_secs_f64();
        let text = output
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        tracing::info!(
            language = %output.language,
            segments = output.segments.len(),
            processing_time,
            "transcription completed"
        );

        Ok(TranscriptionResult {
            text,
            language: output.language,
            language_probability: output.language_probability,
            segments: output.segments,
            processing_time,
            // Report the size actually staged; the declared size is only an
            // upper bound supplied by the client.
            file_info: UploadDescriptor {
                declared_size: Some(staged.size_bytes),
                ..descriptor
            },
        })
    }
}

/// Closed error taxonomy for the request pipeline. Every stage failure is
/// classified here before it leaves the service.
#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("{0}")]
    FileValidation(#[from] FileValidationError),
    #[error("model is not loaded")]
    ModelNotLoaded,
    #[error("file processing failed: {0}")]
    FileProcessing(#[from] StagingError),
    #[error("transcription failed: {0}")]
    Transcription(#[source] EngineError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl TranscribeError {
    pub fn status_code(&self) -> u16 {
        match self {
            TranscribeError::FileValidation(_) => 400,
            TranscribeError::ModelNotLoaded
            | TranscribeError::FileProcessing(_)
            | TranscribeError::Transcription(_)
            | TranscribeError::Internal(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TranscribeError::FileValidation(_) => "FileValidation",
            TranscribeError::ModelNotLoaded => "ModelNotLoaded",
            TranscribeError::FileProcessing(_) => "FileProcessing",
            TranscribeError::Transcription(_) => "Transcription",
            TranscribeError::Internal(_) => "Internal",
        }
    }
}
