//! Integration tests: on-disk repository.

use pb_core::{ComponentType, Document, Node, NodeId, PropValue, props};
use pb_editor::{DocumentRepository, FileRepository, StoreError, StoreFormat};
use pretty_assertions::assert_eq;

fn sample(id: &str) -> Document {
    let mut doc = Document::new(id, "Stored");
    doc.components = vec![
        Node::new(NodeId::intern(&format!("{id}-box")), ComponentType::Container).with_child(
            Node::new(NodeId::intern(&format!("{id}-icon")), ComponentType::Icon)
                .with_props(props([("name", PropValue::from("Star")), ("size", PropValue::Num(24.0))])),
        ),
    ];
    doc
}

#[test]
fn json_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileRepository::open(dir.path()).unwrap();
    let doc = sample("doc-json");

    assert!(repo.save(&doc, 2).unwrap());
    assert!(dir.path().join("doc-json.json").exists());
    assert!(dir.path().join("index.json").exists());

    let saved = repo.load("doc-json").unwrap().unwrap();
    assert_eq!(saved.revision, 2);
    assert_eq!(saved.document, doc);
    assert!(repo.load("doc-absent").unwrap().is_none());
}

#[test]
fn msgpack_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileRepository::with_format(dir.path(), StoreFormat::MessagePack).unwrap();
    let doc = sample("doc-pack");
    repo.save(&doc, 1).unwrap();
    assert!(dir.path().join("doc-pack.msgpack").exists());
    assert_eq!(repo.load("doc-pack").unwrap().unwrap().document, doc);
}

#[test]
fn stale_revision_does_not_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileRepository::open(dir.path()).unwrap();
    let mut doc = sample("doc-race");
    repo.save(&doc, 10).unwrap();
    doc.name = "Older".into();
    assert!(!repo.save(&doc, 9).unwrap());
    assert_eq!(repo.list_all().unwrap()[0].name, "Stored");
}

#[test]
fn delete_removes_file_and_index_entry() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileRepository::open(dir.path()).unwrap();
    repo.save(&sample("doc-a"), 0).unwrap();
    repo.save(&sample("doc-b"), 0).unwrap();
    assert_eq!(repo.list_all().unwrap().len(), 2);

    assert!(repo.delete("doc-a").unwrap());
    assert!(!repo.delete("doc-a").unwrap());
    let ids: Vec<String> = repo.list_all().unwrap().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["doc-b".to_string()]);
}

#[test]
fn path_like_ids_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = FileRepository::open(dir.path()).unwrap();
    for bad in ["../escape", "a/b", "", "index", ".hidden"] {
        let doc = Document::new(bad, "Bad");
        assert!(
            matches!(repo.save(&doc, 0), Err(StoreError::InvalidId(_))),
            "{bad:?} accepted"
        );
    }
}

#[test]
fn corrupt_file_reports_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FileRepository::open(dir.path()).unwrap();
    std::fs::write(dir.path().join("doc-bad.json"), "{ not json").unwrap();
    assert!(matches!(
        repo.load("doc-bad"),
        Err(StoreError::Decode { .. })
    ));
}
