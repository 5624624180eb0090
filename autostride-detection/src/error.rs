use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Failed to read detections from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed detection document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected detection document: {0}")]
    Shape(&'static str),
}

pub type Result<T> = std::result::Result<T, DetectionError>;
