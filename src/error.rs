use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Source Unavailable: {name}: {reason}")]
    SourceUnavailable { name: String, reason: String },

    #[error("Detector Error: {0}")]
    Detector(String),

    #[error("Shape Mismatch: {what} has {actual} rows, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}
