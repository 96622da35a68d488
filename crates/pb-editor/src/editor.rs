//! Editor controller.
//!
//! `Editor` owns the single "current document" slot. Every edit is a pure
//! [`Mutation`] applied to the current snapshot; the result goes through
//! one private commit path that validates it, swaps it in and records it in
//! [`History`]. Undo and redo swap snapshots through the same change hook
//! but are never recorded.

use crate::autosave::{AutoSaver, SaveStatus};
use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::history::History;
use crate::shortcuts::ShortcutAction;
use crate::store::{DocumentMeta, DocumentRepository, MemoryRepository};
use pb_core::mutations::Mutation;
use pb_core::schema::palette_node;
use pb_core::tree::{find_node, find_node_and_parent};
use pb_core::{
    ComponentType, Document, MoveDirection, Node, NodeId, NodePatch, Placement, Props, Styles,
    export, prebuilt, resolve_target, transcode,
};
use std::sync::Arc;

pub struct Editor {
    document: Option<Arc<Document>>,
    history: History,
    /// Bumped on every change of the current document, undo/redo included.
    revision: u64,
    selected: Option<NodeId>,
    /// One-shot insertion target set by "add inside this container".
    target_parent: Option<NodeId>,
    show_debug: bool,
    clipboard: Box<dyn Clipboard>,
    repository: Box<dyn DocumentRepository>,
    autosaver: AutoSaver,
    config: EditorConfig,
}

impl Editor {
    pub fn new(
        config: EditorConfig,
        repository: Box<dyn DocumentRepository>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        Self {
            document: None,
            history: History::new(config.history_limit),
            revision: 0,
            selected: None,
            target_parent: None,
            show_debug: false,
            clipboard,
            repository,
            autosaver: AutoSaver::new(config.autosave_delay_ms, config.saved_indicator_ms),
            config,
        }
    }

    /// An editor backed by an in-memory repository and clipboard.
    pub fn in_memory(config: EditorConfig) -> Self {
        Self::new(
            config,
            Box::new(MemoryRepository::new()),
            Box::new(MemoryClipboard::new()),
        )
    }

    // ─── State ───────────────────────────────────────────────────────────

    pub fn document(&self) -> Option<&Document> {
        self.document.as_deref()
    }

    /// Shared handle to the current snapshot.
    pub fn snapshot(&self) -> Option<Arc<Document>> {
        self.document.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&Node> {
        find_node(&self.document()?.components, self.selected?)
    }

    pub fn target_parent(&self) -> Option<NodeId> {
        self.target_parent
    }

    pub fn show_debug(&self) -> bool {
        self.show_debug
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosaver.status()
    }

    /// Replace the current document wholesale and reset history to a single
    /// entry anchored at it (or to an empty stack for `None`).
    ///
    /// If the repository already holds a copy under the same id, the
    /// revision moves past the stored one so the next save is not stale.
    pub fn set_document(&mut self, doc: Option<Document>) -> Result<(), EditorError> {
        let doc = match doc {
            Some(mut doc) => {
                doc.normalize();
                doc.check_invariants()?;
                Some(Arc::new(doc))
            }
            None => None,
        };
        self.history.reset(doc.clone());
        self.revision += 1;
        if let Some(doc) = &doc {
            match self.repository.stored_revision(&doc.id) {
                Ok(Some(stored)) if stored >= self.revision => self.revision = stored + 1,
                Ok(_) => {}
                Err(e) => log::warn!("could not read stored revision of {}: {e}", doc.id),
            }
        }
        self.document = doc;
        self.selected = None;
        self.target_parent = None;
        Ok(())
    }

    /// The single swap point for the current document.
    fn set_current(&mut self, next: Arc<Document>, description: &str) {
        self.history.on_document_changed(Arc::clone(&next), description);
        if let Some(selected) = self.selected
            && find_node(&next.components, selected).is_none()
        {
            self.selected = None;
        }
        if let Some(target) = self.target_parent
            && find_node(&next.components, target).is_none()
        {
            self.target_parent = None;
        }
        self.document = Some(next);
        self.revision += 1;
    }

    fn commit(&mut self, next: Document, description: &str) -> Result<bool, EditorError> {
        if let Err(e) = next.check_invariants() {
            log::error!("{description}: {e}");
            return Err(e.into());
        }
        self.set_current(Arc::new(next), description);
        Ok(true)
    }

    /// Apply `mutation` to the current snapshot. `Ok(false)` means the
    /// mutation did not apply or changed nothing.
    pub fn apply(&mut self, mutation: Mutation) -> Result<bool, EditorError> {
        let Some(current) = self.document.as_deref() else {
            log::debug!("{}: no document open", mutation.label());
            return Ok(false);
        };
        match mutation.apply(current) {
            Some(next) if next != *current => self.commit(next, mutation.label()),
            _ => {
                log::debug!("{}: no change", mutation.label());
                Ok(false)
            }
        }
    }

    // ─── Structural edits ────────────────────────────────────────────────

    /// Add a palette component of `kind`. Without an explicit `parent`, the
    /// target is resolved from the pending "add into" request and the
    /// selection. Returns the new node's id.
    pub fn add(
        &mut self,
        kind: ComponentType,
        overrides: Props,
        parent: Option<NodeId>,
    ) -> Result<Option<NodeId>, EditorError> {
        self.insert_resolved(palette_node(kind, overrides), parent)
    }

    /// Insert a ready-made node at an explicit target, bypassing resolution.
    /// The node must already carry ids unused in the document; a collision
    /// is refused with [`EditorError::Invariant`].
    pub fn add_node(&mut self, node: Node, parent: Option<NodeId>) -> Result<bool, EditorError> {
        self.apply(Mutation::Add {
            node: Box::new(node),
            parent,
        })
    }

    /// Add a fresh copy of the prebuilt section `name`, resolving the target
    /// like [`Editor::add`].
    pub fn add_prebuilt(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
    ) -> Result<Option<NodeId>, EditorError> {
        let node = prebuilt::instantiate(name)?;
        self.insert_resolved(node, parent)
    }

    fn insert_resolved(
        &mut self,
        node: Node,
        parent: Option<NodeId>,
    ) -> Result<Option<NodeId>, EditorError> {
        let Some(doc) = self.document.as_deref() else {
            return Ok(None);
        };
        // An explicit parent leaves a pending "add into" request in place.
        let explicit = parent.or_else(|| self.target_parent.take());
        let target = resolve_target(doc, explicit, self.selected);
        let id = node.id;
        let added = self.add_node(node, target)?;
        Ok(added.then_some(id))
    }

    pub fn remove(&mut self, id: NodeId) -> Result<bool, EditorError> {
        self.apply(Mutation::Remove { id })
    }

    /// Shallow-merge `props` into the node; `Null` values unset keys.
    pub fn update(&mut self, id: NodeId, props: Props) -> Result<bool, EditorError> {
        self.update_node(id, NodePatch::props(props))
    }

    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> Result<bool, EditorError> {
        self.apply(Mutation::Update { id, patch })
    }

    pub fn move_component(&mut self, id: NodeId, direction: MoveDirection) -> Result<bool, EditorError> {
        self.apply(Mutation::Move { id, direction })
    }

    pub fn rename(&mut self, id: NodeId, name: &str) -> Result<bool, EditorError> {
        self.apply(Mutation::Rename {
            id,
            name: name.to_string(),
        })
    }

    pub fn update_placement(&mut self, id: NodeId, placement: Placement) -> Result<bool, EditorError> {
        self.apply(Mutation::UpdatePlacement { id, placement })
    }

    pub fn reparent(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<bool, EditorError> {
        self.apply(Mutation::Reparent { id, parent, index })
    }

    pub fn promote_to_background(&mut self, container: NodeId, image: NodeId) -> Result<bool, EditorError> {
        self.apply(Mutation::PromoteToBackground { container, image })
    }

    pub fn restore_background(&mut self, container: NodeId) -> Result<bool, EditorError> {
        self.apply(Mutation::RestoreBackground { container })
    }

    pub fn set_page_styles(&mut self, styles: Styles) -> Result<bool, EditorError> {
        self.apply(Mutation::SetPageStyles { styles })
    }

    pub fn set_page_name(&mut self, name: &str) -> Result<bool, EditorError> {
        self.apply(Mutation::SetPageName {
            name: name.to_string(),
        })
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Step back one edit. Returns the description of the undone edit.
    pub fn undo(&mut self) -> Option<String> {
        let (snapshot, description) = self.history.undo()?;
        self.set_current(snapshot, "undo");
        Some(description)
    }

    /// Reapply one undone edit. Returns its description.
    pub fn redo(&mut self) -> Option<String> {
        let (snapshot, description) = self.history.redo()?;
        self.set_current(snapshot, "redo");
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `id`. Returns `false` (and leaves the selection alone) if the
    /// node is not in the document.
    pub fn select(&mut self, id: NodeId) -> bool {
        let exists = self
            .document()
            .is_some_and(|doc| find_node(&doc.components, id).is_some());
        if exists {
            self.selected = Some(id);
        }
        exists
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.target_parent = None;
    }

    /// "Add inside me": the next add lands in `container`, which also
    /// becomes the selection.
    pub fn request_add_into(&mut self, container: NodeId) -> bool {
        let is_container = self
            .document()
            .and_then(|doc| find_node(&doc.components, container))
            .is_some_and(Node::is_container);
        if is_container {
            self.target_parent = Some(container);
            self.selected = Some(container);
        }
        is_container
    }

    fn node_or_selected(&self, id: Option<NodeId>) -> Option<&Node> {
        find_node(&self.document()?.components, id.or(self.selected)?)
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy `id` (or the selection) to the clipboard.
    pub fn copy(&mut self, id: Option<NodeId>) -> Result<bool, EditorError> {
        let Some(node) = self.node_or_selected(id) else {
            return Ok(false);
        };
        let text = transcode::serialize(node);
        self.clipboard.write_text(&text)?;
        Ok(true)
    }

    pub fn cut(&mut self, id: Option<NodeId>) -> Result<bool, EditorError> {
        let Some(target) = self.node_or_selected(id).map(|n| n.id) else {
            return Ok(false);
        };
        self.copy(Some(target))?;
        self.remove(target)
    }

    /// Paste the clipboard contents at the resolved target.
    pub fn paste(&mut self) -> Result<Option<NodeId>, EditorError> {
        let text = self.clipboard.read_text()?;
        self.paste_text(&text)
    }

    /// Paste a payload the host read from an asynchronous clipboard.
    pub fn paste_text(&mut self, text: &str) -> Result<Option<NodeId>, EditorError> {
        let node = transcode::deserialize(text).inspect_err(|e| log::warn!("paste rejected: {e}"))?;
        self.insert_resolved(node, None)
    }

    /// Append a collision-free copy of `id` (or the selection) to the same
    /// parent. Returns the copy's id.
    pub fn duplicate(&mut self, id: Option<NodeId>) -> Result<Option<NodeId>, EditorError> {
        let Some(doc) = self.document.as_deref() else {
            return Ok(None);
        };
        let Some(target) = id.or(self.selected) else {
            return Ok(None);
        };
        let Some(loc) = find_node_and_parent(&doc.components, target) else {
            return Ok(None);
        };
        let parent = loc.parent.map(|p| p.id);
        let copy = transcode::duplicate(loc.node)?;
        let copy_id = copy.id;
        Ok(self.add_node(copy, parent)?.then_some(copy_id))
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// Create, persist and open a blank document. Returns its id.
    pub fn new_document(&mut self, name: Option<&str>) -> Result<String, EditorError> {
        let name = name.unwrap_or(&self.config.default_document_name).to_string();
        let doc = self
            .repository
            .create_new(&name, &self.config.default_page_styles)?;
        let id = doc.id.clone();
        self.open(doc, 0)?;
        Ok(id)
    }

    pub fn load_document(&mut self, id: &str) -> Result<(), EditorError> {
        let saved = self
            .repository
            .load(id)?
            .ok_or_else(|| EditorError::NotFound(id.to_string()))?;
        self.open(saved.document, saved.revision)
    }

    fn open(&mut self, doc: Document, revision: u64) -> Result<(), EditorError> {
        self.set_document(Some(doc))?;
        self.revision = revision;
        self.autosaver.reset(revision);
        Ok(())
    }

    /// Replace the current document with an imported one. Ids are kept;
    /// the import is rejected if it breaks the forest invariant.
    pub fn import_json(&mut self, text: &str) -> Result<(), EditorError> {
        let doc = transcode::document_from_json(text).inspect_err(|e| log::warn!("import rejected: {e}"))?;
        self.set_document(Some(doc))
    }

    pub fn export_json(&self) -> Result<String, EditorError> {
        let doc = self.document().ok_or(EditorError::NoDocument)?;
        Ok(export::to_json(doc, &self.config.export))
    }

    pub fn export_html(&self) -> Result<String, EditorError> {
        let doc = self.document().ok_or(EditorError::NoDocument)?;
        Ok(export::to_html(doc, &self.config.export))
    }

    /// Persist the current document at the current revision.
    pub fn save(&mut self) -> Result<bool, EditorError> {
        let doc = self.document.as_deref().ok_or(EditorError::NoDocument)?;
        Ok(self.repository.save(doc, self.revision)?)
    }

    pub fn list_documents(&self) -> Result<Vec<DocumentMeta>, EditorError> {
        Ok(self.repository.list_all()?)
    }

    /// Delete a stored document. Deleting the open one closes it.
    pub fn delete_document(&mut self, id: &str) -> Result<bool, EditorError> {
        let deleted = self.repository.delete(id)?;
        if self.document().is_some_and(|doc| doc.id == id) {
            self.set_document(None)?;
        }
        Ok(deleted)
    }

    /// Drive autosave from the host's clock.
    pub fn tick(&mut self, now_ms: u64) -> SaveStatus {
        if self.document.is_some() && self.autosaver.poll(self.revision, now_ms) {
            let result = self.save();
            self.autosaver.finish(result, now_ms);
        }
        self.autosaver.status()
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Run the editor side of a shortcut. Returns `true` if anything
    /// happened.
    pub fn dispatch(&mut self, action: ShortcutAction) -> Result<bool, EditorError> {
        match action {
            ShortcutAction::Undo => Ok(self.undo().is_some()),
            ShortcutAction::Redo => Ok(self.redo().is_some()),
            ShortcutAction::Delete => match self.selected {
                Some(id) => self.remove(id),
                None => Ok(false),
            },
            ShortcutAction::Deselect => {
                let had = self.selected.is_some();
                self.clear_selection();
                Ok(had)
            }
            ShortcutAction::Copy => self.copy(None),
            ShortcutAction::Cut => self.cut(None),
            ShortcutAction::Paste => Ok(self.paste()?.is_some()),
            ShortcutAction::Duplicate => Ok(self.duplicate(None)?.is_some()),
            ShortcutAction::Save => self.save(),
            ShortcutAction::NewPage => self.new_document(None).map(|_| true),
            ShortcutAction::ToggleDebug => {
                self.show_debug = !self.show_debug;
                Ok(true)
            }
        }
    }
}
