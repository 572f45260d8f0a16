mod error;
mod health;
mod info;
mod root;
mod transcribe;

pub const SERVICE_NAME: &str = "stt-server";

pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
pub use info::info_handler;
pub use root::root_handler;
pub use transcribe::{MULTIPART_OVERHEAD, TranscriptionResponse, transcribe_handler};
