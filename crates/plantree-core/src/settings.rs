//! Persisted documents: a user-writable location and bundled defaults.
//!
//! The store only needs two calls from its persistence collaborator,
//! `load(key)` and `save(key, value)`. [`FileSettings`] keeps one pretty
//! printed JSON file per key in a directory and replaces files atomically.
//! [`BundledDefaults`] serves the documents compiled into this crate and is
//! read-only.

use std::{
    collections::HashMap,
    fs,
    io::{ErrorKind, Write},
    path::PathBuf,
};

use log::debug;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{EditorError, IoResultExt, Result};

/// Key of the plan tree document.
pub const PLAN_TREE_KEY: &str = "plan_tree";
/// Key of the schema document.
pub const SCHEMA_KEY: &str = "schema";

const DEFAULT_PLAN_TREE: &str = include_str!("../defaults/plan_tree.json");
const DEFAULT_SCHEMA: &str = include_str!("../defaults/schema.json");

/// Read access to stored documents.
pub trait SettingsSource {
    /// Returns the document stored under `key`, `None` if there is none.
    fn load(&self, key: &str) -> Result<Option<Value>>;
}

/// Read/write access to stored documents.
pub trait Settings: SettingsSource {
    /// Stores `value` under `key`, replacing any previous document.
    fn save(&mut self, key: &str, value: &Value) -> Result<()>;
}

/// Documents stored as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSettings {
    dir: PathBuf,
}

impl FileSettings {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SettingsSource for FileSettings {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored document at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e).at_path(path),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| EditorError::parse(&e))
    }
}

impl Settings for FileSettings {
    fn save(&mut self, key: &str, value: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir).at_path(&self.dir)?;

        let path = self.path_for(key);
        let mut file = NamedTempFile::new_in(&self.dir).at_path(&self.dir)?;
        serde_json::to_writer_pretty(&mut file, value)?;
        file.write_all(b"\n").at_path(file.path())?;
        file.persist(&path).map_err(|e| EditorError::FileSystem {
            path: path.clone(),
            source: e.error,
        })?;

        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Read-only documents compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct BundledDefaults {
    documents: HashMap<&'static str, &'static str>,
}

impl BundledDefaults {
    /// The plan tree and schema shipped with this crate.
    pub fn builtin() -> Self {
        Self::empty()
            .with_document(PLAN_TREE_KEY, DEFAULT_PLAN_TREE)
            .with_document(SCHEMA_KEY, DEFAULT_SCHEMA)
    }

    /// No bundled documents at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, key: &'static str, text: &'static str) -> Self {
        self.documents.insert(key, text);
        self
    }
}

impl SettingsSource for BundledDefaults {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        self.documents
            .get(key)
            .map(|text| serde_json::from_str(text).map_err(|e| EditorError::parse(&e)))
            .transpose()
    }
}

/// In-memory documents, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    documents: HashMap<String, Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, key: impl Into<String>, value: Value) -> Self {
        self.documents.insert(key.into(), value);
        self
    }
}

impl SettingsSource for MemorySettings {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.documents.get(key).cloned())
    }
}

impl Settings for MemorySettings {
    fn save(&mut self, key: &str, value: &Value) -> Result<()> {
        self.documents.insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::validation::{validate_plan, validate_schema};

    #[test]
    fn test_file_settings_missing_is_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let settings = FileSettings::new(temp_dir.path());
        assert!(settings.load(PLAN_TREE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_settings_round_trip_creates_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut settings = FileSettings::new(temp_dir.path().join("nested").join("data"));
        let document = json!({"name": "root", "behaviour": {}, "transitions": [], "plans": []});

        settings.save(PLAN_TREE_KEY, &document).unwrap();

        assert!(settings.path_for(PLAN_TREE_KEY).exists());
        assert_eq!(settings.load(PLAN_TREE_KEY).unwrap(), Some(document));
    }

    #[test]
    fn test_file_settings_reports_parse_position() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let settings = FileSettings::new(temp_dir.path());
        fs::write(settings.path_for(SCHEMA_KEY), "{\n\n  oops\n}").unwrap();

        match settings.load(SCHEMA_KEY) {
            Err(EditorError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_builtin_defaults_are_valid() {
        let defaults = BundledDefaults::builtin();
        let tree = defaults.load(PLAN_TREE_KEY).unwrap().expect("bundled tree");
        let schema = defaults.load(SCHEMA_KEY).unwrap().expect("bundled schema");
        validate_plan(&tree).unwrap();
        validate_schema(&schema).unwrap();
        assert!(defaults.load("other").unwrap().is_none());
    }

    #[test]
    fn test_memory_settings() {
        let mut settings = MemorySettings::new().with_document("a", json!(1));
        assert_eq!(settings.load("a").unwrap(), Some(json!(1)));
        settings.save("a", &json!(2)).unwrap();
        assert_eq!(settings.load("a").unwrap(), Some(json!(2)));
    }
}
