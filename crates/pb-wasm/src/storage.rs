//! Browser persistence on top of `localStorage`.
//!
//! Documents live under `builder_doc_<id>`; the project list lives under
//! `builder_projects_index`. The repository logic is written against a
//! small string key-value seam so it can be exercised off the browser.

use chrono::Utc;
use pb_core::Document;
use pb_editor::store::{is_stale, sort_recent_first};
use pb_editor::{DocumentMeta, DocumentRepository, SavedDocument, StoreError};

pub const INDEX_KEY: &str = "builder_projects_index";
pub const DOC_KEY_PREFIX: &str = "builder_doc_";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// `window.localStorage`.
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn open() -> Result<Self, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".into()))?;
        Ok(Self { storage })
    }
}

fn js_error(e: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Unavailable(format!("{e:?}"))
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

pub struct KeyValueRepository<S> {
    store: S,
}

pub type LocalStorageRepository = KeyValueRepository<BrowserStorage>;

impl LocalStorageRepository {
    pub fn open() -> Result<Self, StoreError> {
        Ok(Self::new(BrowserStorage::open()?))
    }
}

impl<S: KeyValueStore> KeyValueRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn doc_key(id: &str) -> String {
        format!("{DOC_KEY_PREFIX}{id}")
    }

    fn read_index(&self) -> Result<Vec<DocumentMeta>, StoreError> {
        match self.store.get(INDEX_KEY)? {
            // A corrupt index is rebuilt on the next save.
            Some(text) => Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("discarding unreadable project index: {e}");
                Vec::new()
            })),
            None => Ok(Vec::new()),
        }
    }

    fn write_index(&self, index: &[DocumentMeta]) -> Result<(), StoreError> {
        self.store.set(INDEX_KEY, &serde_json::to_string(index)?)
    }
}

impl<S: KeyValueStore> DocumentRepository for KeyValueRepository<S> {
    fn save(&mut self, doc: &Document, revision: u64) -> Result<bool, StoreError> {
        let mut index = self.read_index()?;
        let stored = index.iter().find(|m| m.id == doc.id).map(|m| m.revision);
        if is_stale(&doc.id, stored, revision) {
            return Ok(false);
        }

        let body = serde_json::to_string(&SavedDocument {
            revision,
            document: doc.clone(),
        })?;
        self.store.set(&Self::doc_key(&doc.id), &body)?;

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
        Ok(true)
    }

    fn load(&self, id: &str) -> Result<Option<SavedDocument>, StoreError> {
        let Some(text) = self.store.get(&Self::doc_key(id))? else {
            return Ok(None);
        };
        let decode_error = |reason: String| StoreError::Decode {
            id: id.to_string(),
            reason,
        };
        // Bodies written before revisions existed are bare documents.
        let saved = match serde_json::from_str::<SavedDocument>(&text) {
            Ok(saved) => saved,
            Err(_) => SavedDocument {
                revision: 0,
                document: pb_core::transcode::document_from_json(&text)
                    .map_err(|e| decode_error(e.to_string()))?,
            },
        };
        saved
            .document
            .check_invariants()
            .map_err(|e| decode_error(e.to_string()))?;
        Ok(Some(saved))
    }

    fn stored_revision(&self, id: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.read_index()?.into_iter().find(|m| m.id == id).map(|m| m.revision))
    }

    fn list_all(&self) -> Result<Vec<DocumentMeta>, StoreError> {
        let mut index = self.read_index()?;
        sort_recent_first(&mut index);
        Ok(index)
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let key = Self::doc_key(id);
        let existed = self.store.get(&key)?.is_some();
        self.store.remove(&key)?;
        let mut index = self.read_index()?;
        index.retain(|m| m.id != id);
        self.write_index(&index)?;
        Ok(existed)
    }
}
