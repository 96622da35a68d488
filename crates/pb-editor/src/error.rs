//! Error types for the editor crate.

use pb_core::{InvariantError, TranscodeError};
use thiserror::Error;

/// Persistence failure.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode document: {0}")]
    Encode(String),

    #[error("could not decode stored document `{id}`: {reason}")]
    Decode { id: String, reason: String },

    #[error("invalid document id `{0}`")]
    InvalidId(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Encode(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for StoreError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        StoreError::Encode(e.to_string())
    }
}

/// Failure surfaced by an [`crate::Editor`] operation.
///
/// Structural misses never show up here; they are reported as `Ok(false)`.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// An edit would have left two nodes sharing an id. The edit is refused
    /// and the current document is kept.
    #[error("refusing edit: {0}")]
    Invariant(#[from] InvariantError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("no document is open")]
    NoDocument,

    #[error("document `{0}` not found")]
    NotFound(String),

    #[error("invalid config: {0}")]
    Config(String),
}
