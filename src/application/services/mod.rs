mod file_validator;
mod transcription_service;

pub use file_validator::{FileValidationError, FileValidator};
pub use transcription_service::{TranscribeError, TranscriptionService, Upload};
