use std::fmt;

use uuid::Uuid;

/// Relative location of a staged upload inside the staging root.
///
/// Every upload gets a fresh v4 UUID prefix, so two concurrent requests
/// staging the same filename never touch the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingPath(String);

impl StagingPath {
    pub fn for_upload(filename: &str) -> Self {
        // Keep only the final path component of the client-supplied name.
        let name = filename
            .rsplit(['/', '\\'])
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or("upload");
        Self(format!("{}-{}", Uuid::new_v4(), name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StagingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
