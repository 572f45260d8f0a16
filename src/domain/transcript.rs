use super::upload::UploadDescriptor;

/// A contiguous time-bounded span of transcribed speech.
///
/// `start <= end` holds for engine-produced segments; ordering and
/// non-overlap are the engine's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub confidence: Option<f32>,
}

/// The finished transcript for one request. Immutable after assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: String,
    pub language_probability: f32,
    pub segments: Vec<TranscriptionSegment>,
    pub processing_time: f64,
    pub file_info: UploadDescriptor,
}

impl TranscriptionResult {
    pub fn segments_count(&self) -> usize {
        self.segments.len()
    }
}
