//! Clipboard / duplication transcoder.
//!
//! A copied subtree travels as pretty JSON with a `__type` marker, so
//! arbitrary clipboard text can be told apart from a paste payload. Every
//! successful decode regenerates all ids, which makes `duplicate` and
//! `paste` collision-free by construction.

use crate::error::TranscodeError;
use crate::model::{Document, Node};
use crate::tree::regenerate_ids;
use serde_json::Value;

/// Marker key added to serialized nodes.
pub const MARKER_KEY: &str = "__type";
/// Marker value identifying a builder component payload.
pub const MARKER_VALUE: &str = "builder-component";

const REQUIRED_FIELDS: [&str; 3] = ["id", "type", "props"];

/// Encode a node subtree for the clipboard.
pub fn serialize(node: &Node) -> String {
    let mut value = match serde_json::to_value(node) {
        Ok(v) => v,
        Err(e) => {
            // Node contains only strings, numbers and maps; unreachable in
            // practice.
            log::error!("serialize: {e}");
            return String::new();
        }
    };
    if let Value::Object(map) = &mut value {
        map.insert(MARKER_KEY.to_string(), Value::String(MARKER_VALUE.to_string()));
    }
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

/// Decode a clipboard payload into a node with fresh ids.
///
/// # Errors
/// Returns a [`TranscodeError`] for malformed JSON, a missing marker, a
/// missing `id`/`type`/`props`, or a node that does not match the model.
pub fn deserialize(text: &str) -> Result<Node, TranscodeError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(mut map) = value else {
        return Err(TranscodeError::NotAnObject);
    };
    if map.get(MARKER_KEY).and_then(Value::as_str) != Some(MARKER_VALUE) {
        return Err(TranscodeError::MissingMarker);
    }
    for field in REQUIRED_FIELDS {
        if !map.contains_key(field) {
            return Err(TranscodeError::MissingField(field));
        }
    }
    map.remove(MARKER_KEY);

    let mut node: Node = serde_json::from_value(Value::Object(map))?;
    if node.normalize() {
        log::warn!("deserialize: dropped children attached to leaf components");
    }
    Ok(regenerate_ids(&node))
}

/// Produce a collision-free copy of `node` by running it through the
/// clipboard encoding.
pub fn duplicate(node: &Node) -> Result<Node, TranscodeError> {
    deserialize(&serialize(node))
}

/// Parse a whole document (import, stored file). Ids are kept as-is, but
/// the forest invariant is checked.
pub fn document_from_json(text: &str) -> Result<Document, TranscodeError> {
    let mut doc: Document = serde_json::from_str(text)?;
    if doc.normalize() {
        log::warn!("document_from_json: dropped children attached to leaf components");
    }
    doc.check_invariants()?;
    Ok(doc)
}
