use std::path::PathBuf;

use crate::infrastructure::observability::TracingConfig;

const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac", "ogg"];
const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 300;

/// Immutable application configuration, read once from the environment at
/// startup and passed down to each component.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub upload: UploadSettings,
    pub whisper: WhisperSettings,
    pub logging: TracingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub staging_dir: PathBuf,
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WhisperSettings {
    pub model: String,
    pub device: String,
    /// Forced language code; `None` lets the engine auto-detect.
    pub language: Option<String>,
    pub api_base_url: Option<String>,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings {
                host: env_or("HOST", "0.0.0.0"),
                port: env_parsed("PORT", 7920),
            },
            upload: UploadSettings {
                staging_dir: PathBuf::from(env_or("UPLOAD_FOLDER", "uploads")),
                max_file_size: env_parsed("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE),
                allowed_extensions: std::env::var("ALLOWED_EXTENSIONS")
                    .map(|v| {
                        v.split(',')
                            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                            .filter(|e| !e.is_empty())
                            .collect()
                    })
                    .unwrap_or_else(|_| {
                        DEFAULT_ALLOWED_EXTENSIONS
                            .iter()
                            .map(|e| e.to_string())
                            .collect()
                    }),
            },
            whisper: WhisperSettings {
                model: env_or("WHISPER_MODEL", "whisper-1"),
                device: env_or("WHISPER_DEVICE", "cpu"),
                language: std::env::var("WHISPER_LANGUAGE")
                    .ok()
                    .filter(|v| !v.is_empty()),
                api_base_url: std::env::var("WHISPER_API_BASE")
                    .ok()
                    .filter(|v| !v.is_empty()),
                api_key: std::env::var("WHISPER_API_KEY").unwrap_or_default(),
                timeout_secs: env_parsed("WHISPER_TIMEOUT_SECS", DEFAULT_ENGINE_TIMEOUT_SECS),
            },
            logging: TracingConfig {
                environment: env_or("APP_ENV", "development"),
                json_format: env_or("LOG_FORMAT", "").eq_ignore_ascii_case("json"),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
