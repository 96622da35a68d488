//! Clipboard seam.
//!
//! Browsers expose the system clipboard asynchronously; front ends with
//! that constraint read the text themselves and hand it to
//! [`crate::Editor::paste_text`]. Synchronous hosts plug in here.

use crate::error::EditorError;
use std::cell::RefCell;

pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), EditorError>;
    fn read_text(&self) -> Result<String, EditorError>;
}

/// Process-local clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: RefCell<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: RefCell::new(Some(text.into())),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), EditorError> {
        *self.text.borrow_mut() = Some(text.to_string());
        Ok(())
    }

    fn read_text(&self) -> Result<String, EditorError> {
        self.text
            .borrow()
            .clone()
            .ok_or_else(|| EditorError::Clipboard("clipboard is empty".into()))
    }
}
