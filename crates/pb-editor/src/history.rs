//! Snapshot undo/redo history.
//!
//! History is a single vector of document snapshots plus a cursor. The
//! entry at `index` is always the current document; everything before it
//! can be undone to, everything after it redone to. Recording a new
//! snapshot while the cursor is not at the end drops the redo branch.
//!
//! Undo/redo hand back a snapshot and arm a `traveling` flag. The editor
//! then swaps the snapshot in through its normal change path, which calls
//! [`History::on_document_changed`]; the armed flag makes that one call a
//! no-op, so time travel is never recorded as a fresh edit.

use pb_core::Document;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Entry {
    snapshot: Arc<Document>,
    description: String,
}

#[derive(Debug)]
pub struct History {
    entries: Vec<Entry>,
    index: usize,
    /// Maximum number of retained snapshots. 0 means unlimited.
    limit: usize,
    traveling: bool,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            limit,
            traveling: false,
        }
    }

    /// Drop everything and anchor history at `doc`. `None` leaves an empty
    /// stack.
    pub fn reset(&mut self, doc: Option<Arc<Document>>) {
        self.entries.clear();
        self.index = 0;
        self.traveling = false;
        if let Some(snapshot) = doc {
            self.entries.push(Entry {
                snapshot,
                description: "open".to_string(),
            });
        }
        log::trace!("history reset ({} entries)", self.entries.len());
    }

    /// Hook for every change of the current document. Returns `true` if the
    /// snapshot was recorded, `false` if the change came from undo/redo.
    pub fn on_document_changed(&mut self, snapshot: Arc<Document>, description: &str) -> bool {
        if self.traveling {
            self.traveling = false;
            return false;
        }
        self.record(snapshot, description);
        true
    }

    fn record(&mut self, snapshot: Arc<Document>, description: &str) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(Entry {
            snapshot,
            description: description.to_string(),
        });
        self.index = self.entries.len() - 1;

        if self.limit > 0 && self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
            self.index -= excess;
        }
        log::trace!("history record `{description}` at {}", self.index);
    }

    /// Step back. Returns the snapshot to restore and the description of
    /// the edit being undone.
    pub fn undo(&mut self) -> Option<(Arc<Document>, String)> {
        if !self.can_undo() {
            return None;
        }
        let description = self.entries[self.index].description.clone();
        self.index -= 1;
        self.traveling = true;
        log::trace!("history undo `{description}` -> {}", self.index);
        Some((Arc::clone(&self.entries[self.index].snapshot), description))
    }

    /// Step forward. Returns the snapshot to restore and the description of
    /// the edit being redone.
    pub fn redo(&mut self) -> Option<(Arc<Document>, String)> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.traveling = true;
        let entry = &self.entries[self.index];
        log::trace!("history redo `{}` -> {}", entry.description, self.index);
        Some((Arc::clone(&entry.snapshot), entry.description.clone()))
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Description of the edit `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.entries[self.index].description.as_str())
    }

    /// Description of the edit `redo` would reapply.
    pub fn redo_label(&self) -> Option<&str> {
        self.can_redo()
            .then(|| self.entries[self.index + 1].description.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Arc<Document>> {
        self.entries.get(self.index).map(|e| &e.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> Arc<Document> {
        Arc::new(Document::new("h", name))
    }

    fn names(history: &History) -> Vec<String> {
        history
            .entries
            .iter()
            .map(|e| e.snapshot.name.clone())
            .collect()
    }

    #[test]
    fn fresh_reset_cannot_undo() {
        let mut h = History::new(10);
        h.reset(Some(doc("a")));
        assert_eq!(h.len(), 1);
        assert!(!h.can_undo());
        assert!(!h.can_redo());

        h.reset(None);
        assert!(h.is_empty());
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
    }

    #[test]
    fn undo_redo_walks_the_stack() {
        let mut h = History::new(10);
        h.reset(Some(doc("a")));
        h.on_document_changed(doc("b"), "edit b");
        h.on_document_changed(doc("c"), "edit c");

        let (snap, label) = h.undo().unwrap();
        assert_eq!((snap.name.as_str(), label.as_str()), ("b", "edit c"));
        assert!(!h.on_document_changed(snap, "echo"), "time travel must not record");

        let (snap, _) = h.undo().unwrap();
        assert_eq!(snap.name, "a");
        h.on_document_changed(snap, "echo");
        assert!(!h.can_undo());

        let (snap, label) = h.redo().unwrap();
        assert_eq!((snap.name.as_str(), label.as_str()), ("b", "edit b"));
        h.on_document_changed(snap, "echo");
        assert_eq!(names(&h), vec!["a", "b", "c"]);
    }

    #[test]
    fn current_follows_the_cursor() {
        let mut h = History::new(10);
        assert!(h.current().is_none());
        h.reset(Some(doc("a")));
        h.on_document_changed(doc("b"), "b");
        assert_eq!(h.current().map(|d| d.name.as_str()), Some("b"));
        h.undo();
        assert_eq!(h.current().map(|d| d.name.as_str()), Some("a"));
    }

    #[test]
    fn new_edit_after_undo_truncates_redo() {
        let mut h = History::new(10);
        h.reset(Some(doc("a")));
        h.on_document_changed(doc("b"), "b");
        h.on_document_changed(doc("c"), "c");
        let (snap, _) = h.undo().unwrap();
        h.on_document_changed(snap, "echo");
        assert!(h.can_redo());

        h.on_document_changed(doc("d"), "d");
        assert!(!h.can_redo());
        assert_eq!(names(&h), vec!["a", "b", "d"]);
    }

    #[test]
    fn limit_drops_oldest() {
        let mut h = History::new(3);
        h.reset(Some(doc("0")));
        for i in 1..=5 {
            h.on_document_changed(doc(&i.to_string()), "step");
        }
        assert_eq!(names(&h), vec!["3", "4", "5"]);
        assert_eq!(h.index(), 2);
        assert_eq!(h.undo_label(), Some("step"));
    }

    #[test]
    fn labels_track_cursor() {
        let mut h = History::new(0);
        h.reset(Some(doc("a")));
        h.on_document_changed(doc("b"), "add component");
        assert_eq!(h.undo_label(), Some("add component"));
        assert_eq!(h.redo_label(), None);
        let (snap, _) = h.undo().unwrap();
        h.on_document_changed(snap, "echo");
        assert_eq!(h.redo_label(), Some("add component"));
    }
}
