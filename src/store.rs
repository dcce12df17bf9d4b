//! Persistence port for section lists.
//!
//! The core operations are pure; saving and loading goes through an injected
//! [`DocumentStore`]. Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: a map, for tests and embedding.
//! - [`DirStore`]: one `<key>.json` file per key in a directory, used by the CLI.
//!
//! ## Envelope
//!
//! Section lists are stored inside a versioned JSON envelope:
//!
//! ```json
//! { "version": 1, "sections": [ { "id": "section-0", "startLine": 0, ... } ] }
//! ```
//!
//! An envelope written by another format version loads as "not found" rather
//! than as an error, so the caller re-splits the source document.

use crate::section::Section;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Bump to invalidate every stored section list.
const ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid store key {0:?}: use letters, digits, '-' or '_'")]
    InvalidKey(String),
}

/// Key-value persistence for serialized documents.
pub trait DocumentStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory of `<key>.json` files. The directory is created on first save.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl DocumentStore for DirStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(path, value)?;
        Ok(())
    }
}

/// Keys become file names, so they are limited to a safe character set.
fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    sections: Vec<Section>,
}

/// Serialize a section list into `store` under `key`.
pub fn save_sections(
    store: &mut dyn DocumentStore,
    key: &str,
    sections: &[Section],
) -> Result<(), StoreError> {
    let envelope = Envelope {
        version: ENVELOPE_VERSION,
        sections: sections.to_vec(),
    };
    let json = serde_json::to_string_pretty(&envelope)?;
    store.save(key, &json)?;
    tracing::debug!(key, sections = sections.len(), "sections saved");
    Ok(())
}

/// Load a section list. Missing keys and foreign envelope versions are `None`.
pub fn load_sections(
    store: &dyn DocumentStore,
    key: &str,
) -> Result<Option<Vec<Section>>, StoreError> {
    let Some(json) = store.load(key)? else {
        return Ok(None);
    };
    let envelope: Envelope = serde_json::from_str(&json)?;
    if envelope.version != ENVELOPE_VERSION {
        tracing::warn!(
            key,
            found = envelope.version,
            expected = ENVELOPE_VERSION,
            "stored sections use another format version"
        );
        return Ok(None);
    }
    Ok(Some(envelope.sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{create_placeholder, parse_sections};
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_round_trips_sections() {
        let mut store = MemoryStore::new();
        let sections = parse_sections(&sample_policy_markdown());
        save_sections(&mut store, "credit", &sections).unwrap();
        assert_eq!(load_sections(&store, "credit").unwrap(), Some(sections));
    }

    #[test]
    fn missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(load_sections(&store, "nothing").unwrap(), None);
    }

    #[test]
    fn dir_store_writes_json_file() {
        let tmp = TempDir::new().unwrap();
        let mut store = DirStore::new(tmp.path().join("store"));
        let sections = vec![create_placeholder("Purpose", 2, 0)];
        save_sections(&mut store, "policy-1", &sections).unwrap();

        let path = tmp.path().join("store/policy-1.json");
        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"version\": 1"));
        assert!(raw.contains("\"startLine\""));
        assert_eq!(load_sections(&store, "policy-1").unwrap(), Some(sections));
    }

    #[test]
    fn dir_store_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = DirStore::new(tmp.path());
        assert_eq!(store.load("absent").unwrap(), None);
    }

    #[test]
    fn unknown_version_loads_as_not_found() {
        let mut store = MemoryStore::new();
        store
            .save("old", r#"{"version": 99, "sections": []}"#)
            .unwrap();
        assert_eq!(load_sections(&store, "old").unwrap(), None);
    }

    #[test]
    fn corrupt_json_is_an_error() {
        let mut store = MemoryStore::new();
        store.save("bad", "not json").unwrap();
        assert!(matches!(
            load_sections(&store, "bad"),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn path_like_keys_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut store = DirStore::new(tmp.path());
        for key in ["../escape", "a/b", "", "dot.json"] {
            assert!(
                matches!(store.save(key, "{}"), Err(StoreError::InvalidKey(_))),
                "{key:?} accepted"
            );
        }
    }
}
