use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// File name used when no per-user config directory can be resolved
pub const DEFAULT_FILE_NAME: &str = "Quick_Folder_Finder.json";

/// Persisted hotkey → folder path mapping
pub type Mapping = BTreeMap<String, String>;

/// One hotkey bound to one folder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    pub key: String,
    pub path: String,
}

impl Binding {
    pub fn new(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not a valid folder mapping: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Owner of the folder mapping and its backing file.
///
/// Every mutation rewrites the whole file while holding the mapping lock, so
/// at most one writer touches the file at a time. When a write fails the
/// in-memory mapping stays authoritative until the next successful save.
pub struct ConfigStore {
    path: PathBuf,
    mapping: Mutex<Mapping>,
    load_warning: Option<String>,
    modified: AtomicBool,
}

impl ConfigStore {
    /// Open the store at `path`, starting empty if the file is missing or broken
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let (mapping, load_warning) = match Self::read_mapping(&path) {
            Ok(mapping) => {
                info!("Loaded {} folder binding(s) from {:?}", mapping.len(), path);
                (mapping, None)
            }
            Err(e) => {
                warn!("{}; starting with an empty mapping", e);
                (Mapping::new(), Some(e.to_string()))
            }
        };

        Self {
            path,
            mapping: Mutex::new(mapping),
            load_warning,
            modified: AtomicBool::new(false),
        }
    }

    /// Default location of the mapping file for the current user
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "quickfolder", "quickfolder")
            .map(|dirs| dirs.config_dir().join(DEFAULT_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Warning raised while loading, if the file could not be used
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    /// Read the mapping currently on disk.
    ///
    /// A missing file is an empty mapping. An empty object is accepted.
    pub fn load(&self) -> Result<Mapping, StoreError> {
        Self::read_mapping(&self.path)
    }

    /// Copy of the in-memory mapping
    pub fn mapping(&self) -> Mapping {
        self.lock().clone()
    }

    /// All bindings ordered by key
    pub fn bindings(&self) -> Vec<Binding> {
        self.lock()
            .iter()
            .map(|(key, path)| Binding::new(key.as_str(), path.as_str()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write the in-memory mapping to disk
    pub fn save(&self) -> Result<(), StoreError> {
        let mapping = self.lock();
        self.write_mapping(&mapping)
    }

    /// Save on shutdown.
    ///
    /// A file that could not be read at startup is left alone until something
    /// changes, so it can still be repaired by hand. Returns whether it wrote.
    pub fn flush(&self) -> Result<bool, StoreError> {
        if self.load_warning.is_some() && !self.modified.load(Ordering::SeqCst) {
            debug!("Mapping unchanged since a failed load, not overwriting {:?}", self.path);
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Set `key` to `path`, replacing any previous folder, then save
    pub fn upsert(&self, key: &str, path: &str) -> Result<(), StoreError> {
        self.replace(&[], key, path)
    }

    /// Drop every key in `stale`, set `key` to `path`, then save once
    pub fn replace(&self, stale: &[String], key: &str, path: &str) -> Result<(), StoreError> {
        let mut mapping = self.lock();
        for old in stale {
            if mapping.remove(old).is_some() {
                debug!("Dropped '{}' in favour of '{}'", old, key);
            }
        }
        if let Some(previous) = mapping.insert(key.to_string(), path.to_string()) {
            debug!("Replacing folder for '{}': {} -> {}", key, previous, path);
        }
        self.modified.store(true, Ordering::SeqCst);
        self.write_mapping(&mapping)
    }

    /// Drop `key` if present, then save
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_keys(&[key.to_string()])
    }

    /// Drop every key in `keys` that is present, then save once
    pub fn remove_keys(&self, keys: &[String]) -> Result<(), StoreError> {
        let mut mapping = self.lock();
        let before = mapping.len();
        for key in keys {
            mapping.remove(key);
        }
        if mapping.len() == before {
            debug!("No folder bound to {:?}", keys);
        } else {
            self.modified.store(true, Ordering::SeqCst);
        }
        self.write_mapping(&mapping)
    }

    fn lock(&self) -> MutexGuard<'_, Mapping> {
        self.mapping.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_mapping(path: &Path) -> Result<Mapping, StoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No mapping file at {:?}", path);
                return Ok(Mapping::new());
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Mapping::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    // Written next to the target and renamed over it so readers never see a
    // half-written file.
    fn write_mapping(&self, mapping: &Mapping) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(mapping).map_err(|e| {
            StoreError::io(&self.path, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&self.path, e));
        }

        debug!("Saved {} folder binding(s) to {:?}", mapping.len(), self.path);
        Ok(())
    }
}
