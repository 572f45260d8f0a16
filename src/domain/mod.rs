mod staging_path;
mod transcript;
mod upload;

pub use staging_path::StagingPath;
pub use transcript::{TranscriptionResult, TranscriptionSegment};
pub use upload::UploadDescriptor;
