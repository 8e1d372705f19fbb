//! File-backed key/value store.
//!
//! All values live in one JSON object on disk. Every save rewrites the file
//! atomically (temp file + rename).

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::host::PersistenceStore;

const DEFAULT_STORE_PATH: &str = "~/.bench-teleport/store.json";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn default_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde(DEFAULT_STORE_PATH).as_ref())
    }

    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            info!(path = %path.display(), "Store file not found, starting empty");
            return Ok(Self {
                path,
                values: BTreeMap::new(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store file: {}", path.display()))?;
        let values: BTreeMap<String, String> = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse store file: {}", path.display()))?
        };

        debug!(path = %path.display(), keys = values.len(), "Opened store");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Write every value to disk.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&self.values).context("Failed to serialize store")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &json)
            .with_context(|| format!("Failed to write temp store file: {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &self.path).with_context(|| {
            format!("Failed to rename temp file to {}", self.path.display())
        })?;

        debug!(path = %self.path.display(), bytes = json.len(), "Store written");
        Ok(())
    }
}

impl PersistenceStore for JsonFileStore {
    fn load_value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save_value(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn request_autosave(&mut self) -> Result<()> {
        self.flush()
    }
}
