use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::StagingPath;

/// A fully written staged upload. Owned by the orchestrator for one request
/// and always released before the request completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub staging_path: StagingPath,
    pub absolute_path: PathBuf,
    pub size_bytes: u64,
}

#[async_trait::async_trait]
pub trait StagingStore: Send + Sync {
    /// Stream the upload to transient storage. A partial write is aborted
    /// when the stream fails.
    async fn stage(
        &self,
        path: &StagingPath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<StagedFile, StagingError>;

    /// Delete the staged file.
    async fn release(&self, staged: &StagedFile) -> Result<(), StagingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("staging write failed: {0}")]
    WriteFailed(String),
    #[error("staging delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
