//! WASM bridge for the page builder: exposes the editing engine to the
//! browser front end.
//!
//! Compiled via `wasm-pack build --target web`. Methods return plain
//! booleans, ids or JSON strings; the front end re-reads the document with
//! [`PbEditor::document_json`] after every call that reports a change.

pub mod console;
pub mod storage;

use pb_core::schema::{self, ControlKind};
use pb_core::{ComponentType, MoveDirection, NodeId, NodePatch, Placement, Props, Styles, prebuilt};
use pb_editor::{
    Clipboard, DocumentRepository, Editor, EditorConfig, EditorError, MemoryRepository,
    ShortcutAction, ShortcutMap,
};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use storage::LocalStorageRepository;
use wasm_bindgen::prelude::*;

/// Clipboard shared with the bridge, so copies can be handed to JS for the
/// asynchronous system clipboard.
#[derive(Clone, Default)]
struct SharedClipboard(Rc<RefCell<Option<String>>>);

impl SharedClipboard {
    fn take(&self) -> Option<String> {
        self.0.borrow_mut().take()
    }
}

impl Clipboard for SharedClipboard {
    fn write_text(&self, text: &str) -> Result<(), EditorError> {
        *self.0.borrow_mut() = Some(text.to_string());
        Ok(())
    }

    fn read_text(&self) -> Result<String, EditorError> {
        self.0
            .borrow()
            .clone()
            .ok_or_else(|| EditorError::Clipboard("clipboard is empty".into()))
    }
}

/// The WASM-facing editor controller. All interaction from the front end
/// goes through this struct.
#[wasm_bindgen]
pub struct PbEditor {
    editor: Editor,
    clipboard: SharedClipboard,
}

#[wasm_bindgen]
impl PbEditor {
    /// Create an editor backed by `localStorage`. `config_json` overrides
    /// any subset of the editor settings.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Self {
        console_error_panic_hook_setup();
        console::init(log::LevelFilter::Warn);

        let config = match config_json.as_deref().map(EditorConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("ignoring editor config: {e}");
                EditorConfig::default()
            }
            None => EditorConfig::default(),
        };
        let repository: Box<dyn DocumentRepository> = match LocalStorageRepository::open() {
            Ok(repo) => Box::new(repo),
            Err(e) => {
                log::warn!("{e}; documents will not outlive this page");
                Box::new(MemoryRepository::new())
            }
        };
        let clipboard = SharedClipboard::default();
        Self {
            editor: Editor::new(config, repository, Box::new(clipboard.clone())),
            clipboard,
        }
    }

    /// Set the console log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub fn set_log_level(&self, level: &str) {
        log::set_max_level(console::parse_level(level));
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// The open document as JSON, or `"null"`.
    pub fn document_json(&self) -> String {
        match self.editor.document() {
            Some(doc) => serde_json::to_string(doc).unwrap_or_else(|e| {
                log::error!("document serialization failed: {e}");
                "null".to_string()
            }),
            None => "null".to_string(),
        }
    }

    pub fn revision(&self) -> f64 {
        self.editor.revision() as f64
    }

    /// Create, store and open a blank document. Returns its id.
    pub fn new_document(&mut self, name: Option<String>) -> String {
        result_json(self.editor.new_document(name.as_deref()).map(|id| json!({ "id": id })))
    }

    pub fn load_document(&mut self, id: &str) -> String {
        result_json(self.editor.load_document(id).map(|_| Value::Null))
    }

    /// Stored documents as `{"ok":true,"data":[{id, name, lastModified,
    /// revision}]}`, most recent first.
    pub fn list_documents(&self) -> String {
        result_json(
            self.editor
                .list_documents()
                .map(|list| serde_json::to_value(list).unwrap_or(Value::Null)),
        )
    }

    pub fn delete_document(&mut self, id: &str) -> String {
        result_json(self.editor.delete_document(id).map(|d| json!({ "deleted": d })))
    }

    pub fn save(&mut self) -> String {
        result_json(self.editor.save().map(|w| json!({ "written": w })))
    }

    pub fn import_json(&mut self, text: &str) -> String {
        result_json(self.editor.import_json(text).map(|_| Value::Null))
    }

    pub fn export_json(&self) -> String {
        self.editor.export_json().unwrap_or_default()
    }

    pub fn export_html(&self) -> String {
        self.editor.export_html().unwrap_or_default()
    }

    /// Drive autosave. Call periodically with `performance.now()` or
    /// `Date.now()`; returns the indicator state.
    pub fn tick(&mut self, now_ms: f64) -> String {
        self.editor.tick(now_ms.max(0.0) as u64).as_str().to_string()
    }

    /// [`PbEditor::tick`] with the browser clock, for `setInterval`.
    pub fn tick_now(&mut self) -> String {
        self.tick(js_sys::Date::now())
    }

    pub fn save_status(&self) -> String {
        self.editor.save_status().as_str().to_string()
    }

    // ─── Structural edits ────────────────────────────────────────────────

    /// Add a palette component. `props_json` overrides defaults; `parent`
    /// forces the target container. Returns the new id or an empty string.
    pub fn add(&mut self, kind: &str, props_json: Option<String>, parent: Option<String>) -> String {
        let Some(kind) = ComponentType::parse(kind) else {
            log::warn!("unknown component type {kind:?}");
            return String::new();
        };
        let overrides = match props_json.as_deref().map(parse_props).transpose() {
            Ok(p) => p.unwrap_or_default(),
            Err(e) => {
                log::warn!("add {kind:?}: {e}");
                return String::new();
            }
        };
        let parent = parent.as_deref().map(NodeId::intern);
        id_or_empty(self.editor.add(kind, overrides, parent))
    }

    /// Insert a prebuilt section by name, optionally into `parent`.
    /// Returns the new id or "".
    pub fn add_prebuilt(&mut self, name: &str, parent: Option<String>) -> String {
        let parent = parent.as_deref().map(NodeId::intern);
        id_or_empty(self.editor.add_prebuilt(name, parent))
    }

    pub fn remove(&mut self, id: &str) -> bool {
        changed(self.editor.remove(NodeId::intern(id)))
    }

    /// Shallow-merge props from a JSON object; `null` values unset keys.
    pub fn update(&mut self, id: &str, props_json: &str) -> bool {
        match parse_props(props_json) {
            Ok(props) => changed(self.editor.update(NodeId::intern(id), props)),
            Err(e) => {
                log::warn!("update {id}: {e}");
                false
            }
        }
    }

    /// Apply a full patch: `{type?, name?, props?, placement?, children?}`.
    pub fn update_node(&mut self, id: &str, patch_json: &str) -> bool {
        match serde_json::from_str::<NodePatch>(patch_json) {
            Ok(patch) => changed(self.editor.update_node(NodeId::intern(id), patch)),
            Err(e) => {
                log::warn!("update_node {id}: {e}");
                false
            }
        }
    }

    /// Swap with the previous or next sibling (`"previous"` / `"next"`).
    pub fn move_component(&mut self, id: &str, direction: &str) -> bool {
        match MoveDirection::parse(direction) {
            Some(direction) => changed(self.editor.move_component(NodeId::intern(id), direction)),
            None => false,
        }
    }

    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        changed(self.editor.rename(NodeId::intern(id), name))
    }

    /// Merge `{order?, alignSelf?}` into the node's placement.
    pub fn update_placement(&mut self, id: &str, placement_json: &str) -> bool {
        match serde_json::from_str::<Placement>(placement_json) {
            Ok(placement) => changed(self.editor.update_placement(NodeId::intern(id), placement)),
            Err(e) => {
                log::warn!("update_placement {id}: {e}");
                false
            }
        }
    }

    /// Move `id` under `parent` (root when absent) at `index` (end when
    /// absent).
    pub fn reparent(&mut self, id: &str, parent: Option<String>, index: Option<u32>) -> bool {
        let parent = parent.as_deref().map(NodeId::intern);
        changed(
            self.editor
                .reparent(NodeId::intern(id), parent, index.map(|i| i as usize)),
        )
    }

    pub fn promote_to_background(&mut self, container: &str, image: &str) -> bool {
        changed(
            self.editor
                .promote_to_background(NodeId::intern(container), NodeId::intern(image)),
        )
    }

    pub fn restore_background(&mut self, container: &str) -> bool {
        changed(self.editor.restore_background(NodeId::intern(container)))
    }

    pub fn set_page_styles(&mut self, styles_json: &str) -> bool {
        match serde_json::from_str::<Styles>(styles_json) {
            Ok(styles) => changed(self.editor.set_page_styles(styles)),
            Err(e) => {
                log::warn!("set_page_styles: {e}");
                false
            }
        }
    }

    pub fn set_page_name(&mut self, name: &str) -> bool {
        changed(self.editor.set_page_name(name))
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo the last edit. Returns `true` if something was undone.
    pub fn undo(&mut self) -> bool {
        self.editor.undo().is_some()
    }

    /// Redo the last undone edit. Returns `true` if something was redone.
    pub fn redo(&mut self) -> bool {
        self.editor.redo().is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Description of the edit that undo would revert, or "".
    pub fn undo_label(&self) -> String {
        self.editor.history().undo_label().unwrap_or_default().to_string()
    }

    pub fn redo_label(&self) -> String {
        self.editor.history().redo_label().unwrap_or_default().to_string()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, id: &str) -> bool {
        self.editor.select(NodeId::intern(id))
    }

    pub fn clear_selection(&mut self) {
        self.editor.clear_selection();
    }

    /// Selected node id, or "".
    pub fn selected_id(&self) -> String {
        self.editor
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Make `container` the target of the next add.
    pub fn request_add_into(&mut self, container: &str) -> bool {
        self.editor.request_add_into(NodeId::intern(container))
    }

    pub fn show_debug(&self) -> bool {
        self.editor.show_debug()
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Serialize `id` (or the selection) as a clipboard payload. The caller
    /// writes it to `navigator.clipboard`. Returns "" if nothing to copy.
    pub fn copy(&mut self, id: Option<String>) -> String {
        let id = id.as_deref().map(NodeId::intern);
        match self.editor.copy(id) {
            Ok(true) => self.clipboard.take().unwrap_or_default(),
            Ok(false) => String::new(),
            Err(e) => {
                log::warn!("copy failed: {e}");
                String::new()
            }
        }
    }

    /// Like [`PbEditor::copy`], then remove the node.
    pub fn cut(&mut self, id: Option<String>) -> String {
        let id = id.as_deref().map(NodeId::intern);
        match self.editor.cut(id) {
            Ok(true) => self.clipboard.take().unwrap_or_default(),
            Ok(false) => String::new(),
            Err(e) => {
                log::warn!("cut failed: {e}");
                String::new()
            }
        }
    }

    /// Paste text read from `navigator.clipboard`. Returns
    /// `{"ok":true,"id":...}` or `{"ok":false,"error":...}`.
    pub fn paste_text(&mut self, text: &str) -> String {
        result_json(
            self.editor
                .paste_text(text)
                .map(|id| json!({ "id": id.map(|id| id.as_str().to_string()) })),
        )
    }

    /// Duplicate `id` (or the selection). Returns the copy's id or "".
    pub fn duplicate(&mut self, id: Option<String>) -> String {
        let id = id.as_deref().map(NodeId::intern);
        id_or_empty(self.editor.duplicate(id))
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keydown. Returns JSON `{"changed":bool,"action":"..."}`;
    /// copy and cut add a `"clipboard"` payload for the caller to write.
    /// Paste is reported but not performed: the caller reads the system
    /// clipboard and calls [`PbEditor::paste_text`].
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return r#"{"changed":false,"action":"none"}"#.to_string();
        };

        let mut response = json!({ "changed": false, "action": action.as_str() });
        if action == ShortcutAction::Paste {
            return response.to_string();
        }

        match self.editor.dispatch(action) {
            Ok(did) => {
                response["changed"] = Value::Bool(did);
                if matches!(action, ShortcutAction::Copy | ShortcutAction::Cut)
                    && let Some(text) = self.clipboard.take()
                {
                    response["clipboard"] = Value::String(text);
                }
            }
            Err(e) => {
                log::warn!("{}: {e}", action.as_str());
                response["error"] = Value::String(e.to_string());
            }
        }
        response.to_string()
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn parse_props(text: &str) -> Result<Props, serde_json::Error> {
    serde_json::from_str(text)
}

fn changed(result: Result<bool, EditorError>) -> bool {
    result.unwrap_or_else(|e| {
        log::warn!("edit refused: {e}");
        false
    })
}

fn id_or_empty(result: Result<Option<NodeId>, EditorError>) -> String {
    match result {
        Ok(Some(id)) => id.as_str().to_string(),
        Ok(None) => String::new(),
        Err(e) => {
            log::warn!("edit refused: {e}");
            String::new()
        }
    }
}

/// `{"ok":true,...fields}` or `{"ok":false,"error":"..."}`.
fn result_json<E: std::fmt::Display>(result: Result<Value, E>) -> String {
    match result {
        Ok(Value::Object(mut fields)) => {
            fields.insert("ok".into(), Value::Bool(true));
            Value::Object(fields).to_string()
        }
        Ok(Value::Null) => r#"{"ok":true}"#.to_string(),
        Ok(data) => json!({ "ok": true, "data": data }).to_string(),
        Err(e) => json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

fn control_name(kind: ControlKind) -> &'static str {
    match kind {
        ControlKind::Text => "text",
        ControlKind::Number => "number",
        ControlKind::Color => "color",
        ControlKind::Select => "select",
        ControlKind::Toggle => "toggle",
        ControlKind::Box => "box",
        ControlKind::ButtonGroup => "buttonGroup",
    }
}

/// Set up a panic hook that logs to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("page builder panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no editor needed) ─────────────────────────────

/// Validate a clipboard payload. Returns `{"ok":true,"type":...}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_payload(text: &str) -> String {
    result_json(pb_core::transcode::deserialize(text).map(|node| json!({ "type": node.kind })))
}

/// Palette entries with their default props.
#[wasm_bindgen]
pub fn palette_json() -> String {
    let entries: Vec<Value> = ComponentType::ALL
        .iter()
        .map(|&kind| {
            json!({
                "type": kind,
                "label": kind.label(),
                "container": kind.is_container(),
                "defaults": schema::palette_defaults(kind),
            })
        })
        .collect();
    Value::Array(entries).to_string()
}

/// Inspector groups for a component type, or `[]` for unknown types.
#[wasm_bindgen]
pub fn editor_schema_json(kind: &str) -> String {
    let Some(kind) = ComponentType::parse(kind) else {
        return "[]".to_string();
    };
    let groups: Vec<Value> = schema::editor_groups(kind)
        .iter()
        .map(|group| {
            let controls: Vec<Value> = group
                .controls
                .iter()
                .map(|c| {
                    let options: Vec<Value> = c
                        .options
                        .iter()
                        .map(|o| json!({ "value": o.value, "label": o.label }))
                        .collect();
                    json!({
                        "prop": c.prop,
                        "label": c.label,
                        "control": control_name(c.control),
                        "options": options,
                    })
                })
                .collect();
            json!({ "title": group.title, "controls": controls })
        })
        .collect();
    Value::Array(groups).to_string()
}

/// Prebuilt section names and descriptions.
#[wasm_bindgen]
pub fn prebuilt_catalog_json() -> String {
    let entries: Vec<Value> = prebuilt::catalog()
        .iter()
        .map(|p| json!({ "name": p.name, "description": p.description }))
        .collect();
    Value::Array(entries).to_string()
}

/// Render a document JSON string to a standalone HTML page.
#[wasm_bindgen]
pub fn render_html(document_json: &str) -> String {
    match pb_core::transcode::document_from_json(document_json) {
        Ok(doc) => pb_core::to_html(&doc, &pb_core::ExportConfig::default()),
        Err(e) => {
            log::warn!("render_html: {e}");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bridge() -> PbEditor {
        let clipboard = SharedClipboard::default();
        let mut editor = Editor::new(
            EditorConfig::default(),
            Box::new(MemoryRepository::new()),
            Box::new(clipboard.clone()),
        );
        editor.new_document(Some("Bridge")).unwrap();
        PbEditor { editor, clipboard }
    }

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn result_json_shapes() {
        assert_eq!(result_json::<String>(Ok(Value::Null)), r#"{"ok":true}"#);
        assert_eq!(
            parse(&result_json::<String>(Ok(json!({ "id": "x" })))),
            json!({ "ok": true, "id": "x" })
        );
        assert_eq!(
            parse(&result_json::<String>(Err("bad \"quote\"".into()))),
            json!({ "ok": false, "error": "bad \"quote\"" })
        );
    }

    #[test]
    fn add_update_undo_through_bridge() {
        let mut pb = bridge();
        let id = pb.add("text", Some(r#"{"text":"Hi"}"#.into()), None);
        assert!(!id.is_empty());
        assert!(pb.update(&id, r#"{"fontSize":20,"text":null}"#));

        let doc = parse(&pb.document_json());
        let props = &doc["components"][0]["props"];
        assert_eq!(props["fontSize"], json!(20));
        assert!(props.get("text").is_none());

        assert_eq!(pb.undo_label(), "update component");
        assert!(pb.undo());
        assert!(pb.can_redo());
        assert_eq!(pb.add("widget", None, None), "");
        assert!(!pb.update(&id, "not json"));
    }

    #[test]
    fn copy_key_hands_payload_to_js() {
        let mut pb = bridge();
        let id = pb.add("button", None, None);
        assert!(pb.select(&id));

        let response = parse(&pb.handle_key("c", true, false, false, false));
        assert_eq!(response["action"], "copy");
        assert_eq!(response["changed"], true);
        let payload = response["clipboard"].as_str().unwrap().to_string();
        assert_eq!(parse(&validate_payload(&payload))["type"], "button");

        let pasted = parse(&pb.paste_text(&payload));
        assert_eq!(pasted["ok"], true);
        assert_ne!(pasted["id"].as_str().unwrap(), id);

        let paste = parse(&pb.handle_key("v", false, false, false, true));
        assert_eq!(paste, json!({ "changed": false, "action": "paste" }));
        assert_eq!(
            pb.handle_key("q", false, false, false, false),
            r#"{"changed":false,"action":"none"}"#
        );
    }

    #[test]
    fn rejected_paste_reports_error() {
        let mut pb = bridge();
        let response = parse(&pb.paste_text(r#"{"type":"text"}"#));
        assert_eq!(response["ok"], false);
        assert!(response["error"].as_str().is_some());
    }

    #[test]
    fn static_catalogs() {
        let palette = parse(&palette_json());
        assert_eq!(palette.as_array().unwrap().len(), ComponentType::ALL.len());
        assert_eq!(parse(&editor_schema_json("nope")), json!([]));
        assert!(!parse(&editor_schema_json("text")).as_array().unwrap().is_empty());
        let names: Vec<String> = parse(&prebuilt_catalog_json())
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        assert!(names.contains(&"Navbar".to_string()));
    }
}
