//! Error types for the core crate.
//!
//! Structural misses (unknown id, non-container target) are not errors:
//! the mutation engine reports them as "no change". Errors are reserved for
//! malformed external payloads and for broken forest invariants.

use thiserror::Error;

/// Failure to decode a clipboard payload, prebuilt template, or imported
/// document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranscodeError {
    #[error("invalid component data: not valid JSON ({0})")]
    Json(String),

    #[error("invalid component data: expected a JSON object")]
    NotAnObject,

    #[error("invalid component data: missing component marker")]
    MissingMarker,

    #[error("invalid component data: missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid component data: {0}")]
    Shape(String),

    #[error("unknown prebuilt component `{0}`")]
    UnknownPrebuilt(String),

    #[error("invalid document: {0}")]
    Invariant(#[from] InvariantError),
}

impl From<serde_json::Error> for TranscodeError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            TranscodeError::Json(e.to_string())
        } else {
            TranscodeError::Shape(e.to_string())
        }
    }
}

/// A broken forest invariant. Unreachable when every insertion path
/// regenerates ids; seeing one means two places in the tree share a node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("node id `{0}` occurs more than once in the document")]
    DuplicateId(String),
}
