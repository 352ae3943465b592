//! Error types for dars

use thiserror::Error;

/// Result type alias for dars operations
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Viewer error types
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid lesson file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown block kind '{kind}' in section '{section}'")]
    UnknownBlockKind { section: String, kind: String },

    #[error("Block {index} in section '{section}' has no text")]
    MissingBlockText { section: String, index: usize },

    #[error("{0}")]
    Message(String),
}
