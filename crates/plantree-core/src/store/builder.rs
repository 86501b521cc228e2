//! Builder for creating and configuring PlanTreeStore instances.

use std::path::{Path, PathBuf};

use super::PlanTreeStore;
use crate::{
    error::{EditorError, IoResultExt, Result},
    settings::{BundledDefaults, FileSettings, PLAN_TREE_KEY},
};

/// Builder for creating and configuring PlanTreeStore instances.
#[derive(Debug, Clone)]
pub struct StoreBuilder {
    data_dir: Option<PathBuf>,
    defaults: BundledDefaults,
}

impl StoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            data_dir: None,
            defaults: BundledDefaults::builtin(),
        }
    }

    /// Sets a custom directory for the user-writable documents.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/plantree/` or `~/.local/share/plantree/`
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.data_dir = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Replaces the documents used when the data directory has none.
    pub fn with_defaults(mut self, defaults: BundledDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Builds the configured store, loading both documents.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::FileSystem` if the data directory is unusable
    /// Returns `EditorError::StartupDataMissing` if no document can be loaded
    pub fn build(self) -> Result<PlanTreeStore> {
        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => Self::default_data_dir()?,
        };

        std::fs::create_dir_all(&data_dir).at_path(&data_dir)?;

        PlanTreeStore::open(Box::new(FileSettings::new(data_dir)), &self.defaults)
    }

    /// Returns the default data directory following XDG Base Directory
    /// specification.
    pub fn default_data_dir() -> Result<PathBuf> {
        let document = xdg::BaseDirectories::with_prefix("plantree")
            .place_data_file(format!("{PLAN_TREE_KEY}.json"))
            .map_err(|e| EditorError::XdgDirectory(e.to_string()))?;
        document
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| EditorError::XdgDirectory("data file has no parent directory".to_string()))
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
