//! Directory-backed key-value backend.
//!
//! Each key maps to `<dir>/<key>.json`. Writes land in a sibling temporary
//! file that is then renamed over the target, so readers never see a
//! half-written record.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;

use super::KeyValueStore;

/// Key-value store keeping one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| PersistenceError::io(&dir.display().to_string(), e))?;
        tracing::debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check that `key` can name a file in the store.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidKey`] for empty keys, keys starting
    /// with a dot, or keys containing anything but ASCII alphanumerics, `-`,
    /// `_` and `.`.
    pub fn validate_key(key: &str) -> Result<(), PersistenceError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(())
        } else {
            Err(PersistenceError::InvalidKey(key.to_owned()))
        }
    }

    /// File backing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidKey`] if `key` fails
    /// [`validate_key`](Self::validate_key).
    pub fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        Self::validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::io(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            PersistenceError::io(key, e)
        })
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::io(key, e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("cartItems").unwrap(), None);

        store.set("cartItems", r#"[{"productId":1}]"#).unwrap();
        assert_eq!(
            store.get("cartItems").unwrap().as_deref(),
            Some(r#"[{"productId":1}]"#)
        );
        assert!(dir.path().join("cartItems.json").exists());
        assert!(!dir.path().join("cartItems.json.tmp").exists());

        store.remove("cartItems").unwrap();
        assert_eq!(store.get("cartItems").unwrap(), None);
        store.remove("cartItems").unwrap();
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("coItems", "first").unwrap();
        store.set("coItems", "second").unwrap();
        assert_eq!(store.get("coItems").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_open_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state").join("cart");
        let store = FileStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }

    #[test]
    fn test_rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        for key in ["", "../escape", ".hidden", "a/b", "cart items"] {
            assert!(
                matches!(store.set(key, "x"), Err(PersistenceError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }
}
