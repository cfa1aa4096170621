//! Durable key-value storage
//!
//! Scenes are kept under two independent keys, [`ROOT_KEY`] and
//! [`CAMERA_KEY`]. A write replaces the whole entry.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::Result;

/// Key of the persisted top-level shape
pub const ROOT_KEY: &str = "root";

/// Key of the persisted camera state
pub const CAMERA_KEY: &str = "camera";

pub trait Store {
    /// Read an entry, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace an entry
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete an entry if present
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process store, used for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry inside a directory
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written entry.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("marcher_store_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(ROOT_KEY).unwrap(), None);
        store.set(ROOT_KEY, "{}").unwrap();
        assert_eq!(store.get(ROOT_KEY).unwrap().as_deref(), Some("{}"));
        store.remove(ROOT_KEY).unwrap();
        assert_eq!(store.get(ROOT_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = temp_dir("round_trip");
        let mut store = FileStore::new(&dir);

        assert_eq!(store.get(CAMERA_KEY).unwrap(), None);
        store.set(CAMERA_KEY, "first").unwrap();
        store.set(CAMERA_KEY, "second").unwrap();
        assert_eq!(store.get(CAMERA_KEY).unwrap().as_deref(), Some("second"));
        assert!(dir.join("camera.json").exists());
        assert!(!dir.join(".camera.json.tmp").exists());

        store.remove(CAMERA_KEY).unwrap();
        store.remove(CAMERA_KEY).unwrap();
        assert_eq!(store.get(CAMERA_KEY).unwrap(), None);

        fs::remove_dir_all(&dir).ok();
    }
}
