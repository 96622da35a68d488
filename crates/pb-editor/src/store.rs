//! Document persistence.
//!
//! A repository stores whole documents keyed by id, plus a small index of
//! `{id, name, lastModified}` entries for project lists. Every save carries
//! the editor's monotonic revision; a save whose revision is lower than the
//! stored one is skipped, so a slow, older save can never overwrite a newer
//! one.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use pb_core::{Document, Styles};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Index entry for one stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: String,
    pub name: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub revision: u64,
}

/// A stored document together with the revision it was saved at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDocument {
    #[serde(default)]
    pub revision: u64,
    pub document: Document,
}

pub trait DocumentRepository {
    /// Write `doc` at `revision`. Returns `Ok(false)` when the stored copy
    /// already has a higher revision and the write was skipped.
    fn save(&mut self, doc: &Document, revision: u64) -> Result<bool, StoreError>;

    fn load(&self, id: &str) -> Result<Option<SavedDocument>, StoreError>;

    /// All stored documents, most recently modified first.
    fn list_all(&self) -> Result<Vec<DocumentMeta>, StoreError>;

    /// Returns `Ok(false)` if nothing was stored under `id`.
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;

    /// Revision of the stored copy of `id`, if any.
    fn stored_revision(&self, id: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.load(id)?.map(|saved| saved.revision))
    }

    /// Create, persist and return a blank document.
    fn create_new(&mut self, name: &str, styles: &Styles) -> Result<Document, StoreError> {
        let doc = Document::blank(name, styles.clone());
        self.save(&doc, 0)?;
        Ok(doc)
    }
}

/// Most recently modified first; ties broken by id for stable output.
pub fn sort_recent_first(entries: &mut [DocumentMeta]) {
    entries.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Shared revision guard. `stored` is the revision currently persisted.
pub fn is_stale(id: &str, stored: Option<u64>, incoming: u64) -> bool {
    match stored {
        Some(stored) if stored > incoming => {
            log::debug!("skipping stale save of {id}: revision {incoming} < {stored}");
            true
        }
        _ => false,
    }
}

// ─── In-memory ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryRepository {
    docs: HashMap<String, SavedDocument>,
    index: HashMap<String, DocumentMeta>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentRepository for MemoryRepository {
    fn save(&mut self, doc: &Document, revision: u64) -> Result<bool, StoreError> {
        let stored = self.docs.get(&doc.id).map(|s| s.revision);
        if is_stale(&doc.id, stored, revision) {
            return Ok(false);
        }
        self.docs.insert(
            doc.id.clone(),
            SavedDocument {
                revision,
                document: doc.clone(),
            },
        );
        self.index.insert(
            doc.id.clone(),
            DocumentMeta {
                id: doc.id.clone(),
                name: doc.name.clone(),
                last_modified: Utc::now(),
                revision,
            },
        );
        Ok(true)
    }

    fn load(&self, id: &str) -> Result<Option<SavedDocument>, StoreError> {
        Ok(self.docs.get(id).cloned())
    }

    fn list_all(&self) -> Result<Vec<DocumentMeta>, StoreError> {
        let mut entries: Vec<DocumentMeta> = self.index.values().cloned().collect();
        sort_recent_first(&mut entries);
        Ok(entries)
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        self.index.remove(id);
        Ok(self.docs.remove(id).is_some())
    }
}

// ─── Directory on disk ───────────────────────────────────────────────────

/// Encoding of document bodies on disk. The index is always JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFormat {
    #[default]
    Json,
    MessagePack,
}

impl StoreFormat {
    fn extension(self) -> &'static str {
        match self {
            StoreFormat::Json => "json",
            StoreFormat::MessagePack => "msgpack",
        }
    }
}

const INDEX_FILE: &str = "index.json";

/// One file per document plus `index.json`, all in one directory.
#[derive(Debug, Clone)]
pub struct FileRepository {
    dir: PathBuf,
    format: StoreFormat,
}

impl FileRepository {
    /// Open (creating if needed) a repository rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::with_format(dir, StoreFormat::Json)
    }

    pub fn with_format(dir: impl Into<PathBuf>, format: StoreFormat) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, format })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn doc_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id != "index"
            && !id.starts_with('.')
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.{}", self.format.extension())))
    }

    fn read_index(&self) -> Result<Vec<DocumentMeta>, StoreError> {
        let path = self.dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|e| StoreError::Decode {
            id: INDEX_FILE.to_string(),
            reason: e.to_string(),
        })
    }

    fn write_index(&self, entries: &[DocumentMeta]) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(self.dir.join(INDEX_FILE), text)?;
        Ok(())
    }

    fn encode(&self, saved: &SavedDocument) -> Result<Vec<u8>, StoreError> {
        Ok(match self.format {
            StoreFormat::Json => serde_json::to_vec_pretty(saved)?,
            StoreFormat::MessagePack => rmp_serde::to_vec_named(saved)?,
        })
    }

    fn decode(&self, id: &str, bytes: &[u8]) -> Result<SavedDocument, StoreError> {
        let decoded = match self.format {
            StoreFormat::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
            StoreFormat::MessagePack => rmp_serde::from_slice(bytes).map_err(|e| e.to_string()),
        };
        decoded.map_err(|reason| StoreError::Decode {
            id: id.to_string(),
            reason,
        })
    }
}

impl DocumentRepository for FileRepository {
    fn save(&mut self, doc: &Document, revision: u64) -> Result<bool, StoreError> {
        let path = self.doc_path(&doc.id)?;
        let mut index = self.read_index()?;
        let stored = index.iter().find(|m| m.id == doc.id).map(|m| m.revision);
        if is_stale(&doc.id, stored, revision) {
            return Ok(false);
        }

        let bytes = self.encode(&SavedDocument {
            revision,
            document: doc.clone(),
        })?;
        fs::write(&path, bytes)?;

        let now = Utc::now();
        match index.iter_mut().find(|m| m.id == doc.id) {
            Some(entry) => {
                entry.name = doc.name.clone();
                entry.last_modified = now;
                entry.revision = revision;
            }
            None => index.push(DocumentMeta {
                id: doc.id.clone(),
                name: doc.name.clone(),
                last_modified: now,
                revision,
            }),
        }
        self.write_index(&index)?;
        log::debug!("saved {} (revision {revision}) to {}", doc.id, path.display());
        Ok(true)
    }

    fn load(&self, id: &str) -> Result<Option<SavedDocument>, StoreError> {
        let path = self.doc_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let mut saved = self.decode(id, &bytes)?;
        if saved.document.normalize() {
            log::warn!("load {id}: dropped children attached to leaf components");
        }
        saved
            .document
            .check_invariants()
            .map_err(|e| StoreError::Decode {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(saved))
    }

    fn stored_revision(&self, id: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.read_index()?.into_iter().find(|m| m.id == id).map(|m| m.revision))
    }

    fn list_all(&self) -> Result<Vec<DocumentMeta>, StoreError> {
        let mut entries = self.read_index()?;
        sort_recent_first(&mut entries);
        Ok(entries)
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let path = self.doc_path(id)?;
        let existed = path.exists();
        if existed {
            fs::remove_file(&path)?;
        }
        let mut index = self.read_index()?;
        let before = index.len();
        index.retain(|m| m.id != id);
        if index.len() != before {
            self.write_index(&index)?;
        }
        Ok(existed)
    }
}
