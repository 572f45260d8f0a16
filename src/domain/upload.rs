/// Metadata for an uploaded file, valid for the duration of one request.
///
/// The byte stream itself travels separately; this carries only what the
/// caller declared about the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDescriptor {
    pub filename: String,
    pub content_type: Option<String>,
    pub declared_size: Option<u64>,
}

impl UploadDescriptor {
    pub fn new(filename: String, content_type: Option<String>, declared_size: Option<u64>) -> Self {
        Self {
            filename,
            content_type,
            declared_size,
        }
    }

    /// Lowercased substring after the last `.`, or `None` when the filename
    /// has no dot.
    pub fn extension(&self) -> Option<String> {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }
}
