use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{StagedFile, StagingError, StagingStore};
use crate::domain::StagingPath;

/// Filesystem-backed staging under a single root directory. Writes go
/// through a multipart upload so a failed stream leaves no partial file.
pub struct LocalStagingStore {
    inner: Arc<LocalFileSystem>,
    base_path: PathBuf,
}

impl LocalStagingStore {
    pub fn new(base_path: PathBuf) -> Result<Self, StagingError> {
        std::fs::create_dir_all(&base_path).map_err(StagingError::Io)?;
        let base_path = base_path.canonicalize().map_err(StagingError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| StagingError::WriteFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            base_path,
        })
    }
}

#[async_trait::async_trait]
impl StagingStore for LocalStagingStore {
    async fn stage(
        &self,
        path: &StagingPath,
        mut stream: BoxStream<'_, Result<Bytes, std::io::Error>>,
    ) -> Result<StagedFile, StagingError> {
        let store_path = StorePath::from(path.as_str());
        let mut upload = self
            .inner
            .put_multipart(&store_path)
            .await
            .map_err(|e| StagingError::WriteFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(StagingError::Io(e));
                }
            };
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(StagingError::WriteFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| StagingError::WriteFailed(e.to_string()))?;

        let absolute_path = path
            .as_str()
            .split('/')
            .fold(self.base_path.clone(), |p, part| p.join(part));

        Ok(StagedFile {
            staging_path: path.clone(),
            absolute_path,
            size_bytes: total_bytes,
        })
    }

    async fn release(&self, staged: &StagedFile) -> Result<(), StagingError> {
        let store_path = StorePath::from(staged.staging_path.as_str());
        self.inner
            .delete(&store_path)
            .await
            .map_err(|e| StagingError::DeleteFailed(e.to_string()))
    }
}
