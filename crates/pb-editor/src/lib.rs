pub mod autosave;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod shortcuts;
pub mod store;

pub use autosave::{AutoSaver, SaveStatus};
pub use clipboard::{Clipboard, MemoryClipboard};
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, StoreError};
pub use history::History;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::{
    DocumentMeta, DocumentRepository, FileRepository, MemoryRepository, SavedDocument, StoreFormat,
};
