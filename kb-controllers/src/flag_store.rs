//! Persisted boolean flags (e.g. "onboarding completed").
//!
//! Components receive a [`FlagStore`] instead of touching storage
//! directly. Two backends are provided: in-memory for tests and a small
//! JSON file for the application.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::errors::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Get/set access to named boolean flags. Unknown flags read as `false`.
pub trait FlagStore: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> StoreResult<bool>;

    fn set(&self, key: &str, value: bool) -> StoreResult<()>;
}

/// In-memory flag storage.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: RwLock<BTreeMap<String, bool>>,
}

impl MemoryFlagStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one flag already set.
    #[must_use]
    pub fn with_flag(key: &str, value: bool) -> Self {
        let mut flags = BTreeMap::new();
        flags.insert(key.to_string(), value);
        Self {
            flags: RwLock::new(flags),
        }
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> StoreResult<bool> {
        let guard = self
            .flags
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(guard.get(key).copied().unwrap_or(false))
    }

    fn set(&self, key: &str, value: bool) -> StoreResult<()> {
        let mut guard = self
            .flags
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        guard.insert(key.to_string(), value);
        Ok(())
    }
}

/// Flags kept as a JSON object in a single file, e.g. `{"onboarding_complete": true}`.
#[derive(Debug, Clone)]
pub struct JsonFileFlagStore {
    path: PathBuf,
}

impl JsonFileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<BTreeMap<String, bool>> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl FlagStore for JsonFileFlagStore {
    fn get(&self, key: &str) -> StoreResult<bool> {
        Ok(self.load()?.get(key).copied().unwrap_or(false))
    }

    fn set(&self, key: &str, value: bool) -> StoreResult<()> {
        let mut flags = self.load()?;
        flags.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&flags)?)?;
        debug!(path = %self.path.display(), key, value, "flag persisted");
        Ok(())
    }
}
