mod settings;

pub use settings::{ServerSettings, Settings, UploadSettings, WhisperSettings};
