use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::DataSourceError;
use super::loader::{load_file, LoadOptions, LoadedDataset};

/// Cheap identity of a file on disk: if neither the size nor the mtime
/// changed, the contents are assumed unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self, DataSourceError> {
        let meta = std::fs::metadata(path).map_err(|source| DataSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Fingerprint {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug)]
struct CacheEntry {
    fingerprint: Fingerprint,
    options: LoadOptions,
    dataset: Arc<LoadedDataset>,
}

/// Loaded tables keyed by canonical path. Lives as long as its owner; the
/// desktop app keeps one for the whole process.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, reading the file only when it is
    /// new, has changed on disk, or was loaded with different options.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> Result<Arc<LoadedDataset>, DataSourceError> {
        let key = path.canonicalize().map_err(|source| DataSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fingerprint = Fingerprint::of(&key)?;

        if let Some(entry) = self.entries.get(&key) {
            if entry.fingerprint == fingerprint && entry.options == *options {
                log::debug!("Using cached table for {}", key.display());
                return Ok(Arc::clone(&entry.dataset));
            }
            log::info!("{} changed on disk, reloading", key.display());
        }

        let dataset = Arc::new(load_file(&key, options)?);
        self.entries.insert(
            key,
            CacheEntry {
                fingerprint,
                options: options.clone(),
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
