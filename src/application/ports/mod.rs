mod staging_store;
mod transcription_engine;

pub use staging_store::{StagedFile, StagingError, StagingStore};
pub use transcription_engine::{EngineError, EngineOutput, TranscriptionEngine};
