use std::path::PathBuf;
use thiserror::Error;

/// Errors that can end an export without a file being written.
///
/// Capture and decode problems are not listed here: those degrade to a
/// drawing-only export instead of failing.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write {file_name}: {source}")]
    Download {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Why a captured background could not be turned into pixels
#[derive(Debug, Error)]
pub enum CaptureDecodeError {
    #[error("Not a data URL: {0}")]
    NotDataUrl(String),

    #[error("Data URL is not base64 encoded")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Unreadable image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Captured image is empty")]
    Empty,
}

/// Errors raised while loading or validating an `OverlayConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
