//! Integration tests: end-to-end editing sessions against a repository.

use pb_core::tree::find_node;
use pb_core::{ComponentType, NodeId, PropValue, Props, props};
use pb_editor::{
    DocumentRepository, Editor, EditorConfig, EditorError, FileRepository, MemoryClipboard,
    MemoryRepository, SaveStatus, ShortcutMap,
};
use pretty_assertions::assert_eq;

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

// ─── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn add_then_remove_returns_to_empty() {
    let mut editor = Editor::in_memory(EditorConfig::default());
    editor.new_document(None).unwrap();
    assert_eq!(editor.document().unwrap().name, "New Project");

    let text = editor.add(ComponentType::Text, Props::new(), None).unwrap().unwrap();
    assert!(editor.remove(text).unwrap());
    assert!(editor.document().unwrap().components.is_empty());
}

#[test]
fn nested_add_keeps_root_length() {
    let mut editor = Editor::in_memory(EditorConfig::default());
    editor.new_document(None).unwrap();
    let c = editor.add(ComponentType::Container, Props::new(), None).unwrap().unwrap();
    let b = editor.add(ComponentType::Button, Props::new(), Some(c)).unwrap().unwrap();

    let doc = editor.document().unwrap();
    assert_eq!(doc.components.len(), 1);
    assert_eq!(doc.components[0].children()[0].id, b);
    // Palette defaults were applied.
    assert_eq!(doc.components[0].children()[0].props["text"], PropValue::from("Click me"));
}

#[test]
fn prebuilt_goes_into_selected_container() {
    let mut editor = Editor::in_memory(EditorConfig::default());
    editor.import_json(include_str!("fixtures/landing.json")).unwrap();
    editor.select(id("hero"));
    let added = editor.add_prebuilt("Cards Section", None).unwrap().unwrap();

    let doc = editor.document().unwrap();
    let hero = find_node(&doc.components, id("hero")).unwrap();
    assert_eq!(hero.children().last().map(|n| n.id), Some(added));
    doc.check_invariants().unwrap();

    assert!(matches!(
        editor.add_prebuilt("Nope", None),
        Err(EditorError::Transcode(_))
    ));
}

#[test]
fn background_promotion_round_trips_through_history() {
    let mut editor = Editor::in_memory(EditorConfig::default());
    editor.import_json(include_str!("fixtures/landing.json")).unwrap();
    let before = editor.snapshot().unwrap();

    assert!(editor.promote_to_background(id("hero"), id("photo")).unwrap());
    assert!(!editor.promote_to_background(id("hero"), id("headline")).unwrap());
    assert!(editor.restore_background(id("hero")).unwrap());
    let hero = find_node(&editor.document().unwrap().components, id("hero")).unwrap();
    assert_eq!(hero.children()[0].id, id("photo"));

    editor.undo();
    editor.undo();
    assert_eq!(*editor.snapshot().unwrap(), *before);
}

#[test]
fn shortcuts_drive_the_editor() {
    let mut editor = Editor::new(
        EditorConfig::default(),
        Box::new(MemoryRepository::new()),
        Box::new(MemoryClipboard::new()),
    );
    editor.import_json(include_str!("fixtures/landing.json")).unwrap();
    editor.select(id("star"));

    let copy = ShortcutMap::resolve("c", true, false, false, false).unwrap();
    let paste = ShortcutMap::resolve("v", true, false, false, false).unwrap();
    let undo = ShortcutMap::resolve("z", false, false, false, true).unwrap();
    assert!(editor.dispatch(copy).unwrap());
    assert!(editor.dispatch(paste).unwrap());
    assert_eq!(editor.document().unwrap().components.len(), 4);
    assert!(editor.dispatch(undo).unwrap());
    assert_eq!(editor.document().unwrap().components.len(), 3);
}

// ─── Persistence ────────────────────────────────────────────────────────

#[test]
fn save_and_reload_keeps_revision() {
    let mut editor = Editor::in_memory(EditorConfig::default());
    let doc_id = editor.new_document(Some("Persisted")).unwrap();
    editor.add(ComponentType::Image, Props::new(), None).unwrap();
    editor.set_page_name("Renamed").unwrap();
    let revision = editor.revision();
    assert!(editor.save().unwrap());

    let listed = editor.list_documents().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Renamed");
    assert_eq!(listed[0].revision, revision);

    editor.set_document(None).unwrap();
    editor.load_document(&doc_id).unwrap();
    assert_eq!(editor.revision(), revision);
    assert_eq!(editor.document().unwrap().components.len(), 1);
    assert!(!editor.can_undo());

    assert!(matches!(
        editor.load_document("doc-missing"),
        Err(EditorError::NotFound(_))
    ));
}

#[test]
fn stale_save_is_skipped() {
    let mut repo = MemoryRepository::new();
    let doc = repo.create_new("Race", &Default::default()).unwrap();
    let mut newer = doc.clone();
    newer.name = "Newer".into();
    assert!(repo.save(&newer, 7).unwrap());
    assert!(!repo.save(&doc, 5).unwrap());
    assert_eq!(repo.load(&doc.id).unwrap().unwrap().document.name, "Newer");
}

#[test]
fn imported_copy_of_stored_document_saves_over_it() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        Editor::new(
            EditorConfig::default(),
            Box::new(FileRepository::open(dir.path()).unwrap()),
            Box::new(MemoryClipboard::new()),
        )
    };

    let mut first = open();
    let doc_id = first.new_document(Some("Shared")).unwrap();
    for _ in 0..3 {
        first.add(ComponentType::Text, Props::new(), None).unwrap();
    }
    assert!(first.save().unwrap());
    let exported = first.export_json().unwrap();

    let mut second = open();
    second.import_json(&exported).unwrap();
    assert!(second.revision() > first.revision());
    second.add(ComponentType::Button, Props::new(), None).unwrap();
    assert!(second.save().unwrap());
    assert_eq!(second.tick(0), SaveStatus::Waiting);
    assert_eq!(second.tick(2000), SaveStatus::Saved);

    let mut reader = open();
    reader.load_document(&doc_id).unwrap();
    assert_eq!(reader.document().unwrap().components.len(), 4);
    assert_eq!(reader.revision(), second.revision());
}

#[test]
fn autosave_does_not_claim_a_stale_save() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        Editor::new(
            EditorConfig::default(),
            Box::new(FileRepository::open(dir.path()).unwrap()),
            Box::new(MemoryClipboard::new()),
        )
    };
    let mut editor = open();
    let doc_id = editor.new_document(None).unwrap();
    editor.add(ComponentType::Text, Props::new(), None).unwrap();

    // Another session stores a much newer revision meanwhile.
    let mut other = FileRepository::open(dir.path()).unwrap();
    let newer = other.load(&doc_id).unwrap().unwrap().document;
    assert!(other.save(&newer, 50).unwrap());

    assert_eq!(editor.tick(0), SaveStatus::Waiting);
    assert_eq!(editor.tick(2000), SaveStatus::Idle);
    assert_eq!(editor.save_status(), SaveStatus::Idle);
}

#[test]
fn autosave_debounces_edits() {
    let mut editor = Editor::in_memory(EditorConfig::default());
    let doc_id = editor.new_document(None).unwrap();
    assert_eq!(editor.tick(0), SaveStatus::Idle);

    let text = editor.add(ComponentType::Text, Props::new(), None).unwrap().unwrap();
    assert_eq!(editor.tick(100), SaveStatus::Waiting);
    editor.update(text, props([("content", "Draft")])).unwrap();
    assert_eq!(editor.tick(1000), SaveStatus::Waiting);
    assert_eq!(editor.tick(2000), SaveStatus::Waiting);
    assert_eq!(editor.tick(2500), SaveStatus::Saved);

    let stored = editor.list_documents().unwrap();
    assert_eq!(stored[0].id, doc_id);
    assert_eq!(stored[0].revision, editor.revision());
    assert_eq!(editor.tick(6000), SaveStatus::Idle);
}

#[test]
fn deleting_open_document_closes_it() {
    let mut editor = Editor::in_memory(EditorConfig::default());
    let doc_id = editor.new_document(None).unwrap();
    assert!(editor.delete_document(&doc_id).unwrap());
    assert!(editor.document().is_none());
    assert!(matches!(editor.save(), Err(EditorError::NoDocument)));
}

#[test]
fn exports_reflect_current_document() {
    let mut editor = Editor::in_memory(EditorConfig::default());
    assert!(matches!(editor.export_html(), Err(EditorError::NoDocument)));
    editor.import_json(include_str!("fixtures/landing.json")).unwrap();
    let html = editor.export_html().unwrap();
    assert!(html.contains("<p id=\"headline\""));
    let json = editor.export_json().unwrap();
    let back: pb_core::Document = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, editor.document().unwrap());
}
