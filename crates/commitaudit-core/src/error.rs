//! Error types for commitaudit.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown resource kind: {0}")]
    UnknownResourceKind(String),

    #[error("Malformed shape identifier: {0}")]
    MalformedShapeIdentifier(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
