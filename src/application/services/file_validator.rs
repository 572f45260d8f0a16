use std::collections::HashSet;

use crate::domain::UploadDescriptor;

/// Format and size policy for inbound uploads. Runs before any byte is
/// staged; has no side effects.
pub struct FileValidator {
    allowed_extensions: HashSet<String>,
    max_file_size: u64,
}

impl FileValidator {
    pub fn new(allowed_extensions: impl IntoIterator<Item = String>, max_file_size: u64) -> Self {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            allowed_extensions,
            max_file_size,
        }
    }

    pub fn validate(&self, descriptor: &UploadDescriptor) -> Result<(), FileValidationError> {
        if descriptor.filename.is_empty() {
            return Err(FileValidationError::EmptyFilename);
        }

        match descriptor.extension() {
            Some(ext) if self.allowed_extensions.contains(&ext) => {}
            _ => {
                let mut supported: Vec<&str> =
                    self.allowed_extensions.iter().map(String::as_str).collect();
                supported.sort_unstable();
                return Err(FileValidationError::UnsupportedFormat {
                    supported: supported.join(", "),
                });
            }
        }

        if let Some(size) = descriptor.declared_size {
            if size > self.max_file_size {
                return Err(FileValidationError::TooLarge {
                    max_mb: self.max_file_size / (1024 * 1024),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileValidationError {
    #[error("no file supplied")]
    MissingFile,
    #[error("no file selected")]
    EmptyFilename,
    #[error("unsupported file format; supported formats: {supported}")]
    UnsupportedFormat { supported: String },
    #[error("file too large; maximum size: {max_mb}MB")]
    TooLarge { max_mb: u64 },
}
