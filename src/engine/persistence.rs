use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use crate::Result;
use log::warn;

#[allow(unused_imports)]
use crate::engine::MemStore;

/// The raw key-value namespace: storage key -> stored text.
pub type Namespace = BTreeMap<String, String>;

const STORE_FILE: &str = "store.json";

/// Handles disk I/O for the [`MemStore`].
///
/// The whole namespace lives in one `store.json` file and is rewritten with an
/// atomic "write-then-rename" strategy, so readers of the file only ever see a
/// complete document.
pub struct Persistence {
    data_dir: PathBuf,
}

impl Persistence {
    /// Initializes a new `Persistence` handler in the specified directory.
    ///
    /// If the directory does not exist, it will be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { data_dir: dir })
    }

    pub fn file_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    /// Writes the namespace to disk atomically.
    pub fn save(&self, data: &Namespace) -> Result<()> {
        let file_path = self.file_path();
        let temp_path = file_path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(data)?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &file_path)?;

        Ok(())
    }

    /// Loads the namespace from disk.
    ///
    /// A missing file is an empty namespace. A file that cannot be read or
    /// parsed is moved aside to `store.json.corrupt` and an empty namespace is
    /// returned, so later writes never overwrite it.
    pub fn load(&self) -> Result<Namespace> {
        let file_path = self.file_path();

        let content = match fs::read(&file_path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Namespace::new()),
            Err(e) => {
                warn!("Could not read store file {:?}: {}", file_path, e);
                self.quarantine(&file_path)?;
                return Ok(Namespace::new());
            }
        };

        match serde_json::from_slice(&content) {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!("Could not unmarshal store data from {:?}: {}", file_path, e);
                self.quarantine(&file_path)?;
                Ok(Namespace::new())
            }
        }
    }

    fn quarantine(&self, file_path: &Path) -> Result<()> {
        let corrupt_path = file_path.with_extension("json.corrupt");
        fs::rename(file_path, &corrupt_path)?;
        warn!("Moved unreadable store file to {:?}", corrupt_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path()).unwrap();

        let mut data = Namespace::new();
        data.insert("monitor-note-2024-03-05".to_string(), "hello".to_string());
        data.insert("theme".to_string(), "dark".to_string());

        persistence.save(&data).unwrap();

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_atomic_rename() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path()).unwrap();

        persistence.save(&Namespace::new()).unwrap();

        assert!(dir.path().join("store.json").exists());
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path().join("nested")).unwrap();
        assert!(persistence.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_moved_aside() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("store.json"), b"{ not json").unwrap();

        let persistence = Persistence::new(dir.path()).unwrap();
        assert!(persistence.load().unwrap().is_empty());

        assert!(!dir.path().join("store.json").exists());
        let kept = fs::read(dir.path().join("store.json.corrupt")).unwrap();
        assert_eq!(kept, b"{ not json");
    }

    #[test]
    fn test_save_fails_without_directory() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("gone");
        let persistence = Persistence::new(&data_dir).unwrap();
        fs::remove_dir(&data_dir).unwrap();

        assert!(persistence.save(&Namespace::new()).is_err());
    }
}
