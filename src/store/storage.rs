use anyhow::{Context, Result};
use std::{
    fs::{create_dir_all, read_to_string, write},
    io::ErrorKind,
    path::Path,
};

#[cfg(test)]
use parking_lot::RwLock;
#[cfg(test)]
use std::{collections::HashMap, path::PathBuf};

/// Flat text storage keyed by path.
///
/// A missing entry reads as `None`; writes overwrite in place.
pub trait Storage: Send + Sync {
    fn read(&self, path: &Path) -> Result<Option<String>>;

    fn write(&self, path: &Path, text: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> Result<Option<String>> {
        match read_to_string(path) {
            Ok(text) if text.is_empty() => Ok(None),
            Ok(text) => {
                debug!("cache hit: {}", path.display());
                Ok(Some(text))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    // Not atomic: a crash mid-write can leave a truncated file behind.
    fn write(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("cache write: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<PathBuf, String>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> Result<Option<String>> {
        Ok(self
            .entries
            .read()
            .get(path)
            .filter(|v| !v.is_empty())
            .cloned())
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        self.entries
            .write()
            .insert(path.to_path_buf(), text.to_string());
        Ok(())
    }
}
