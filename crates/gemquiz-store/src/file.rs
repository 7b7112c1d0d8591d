//! One JSON file per key inside a data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use gemquiz_core::error::StoreError;
use gemquiz_core::storage::KeyValueStore;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file first and are renamed into place, so a crash
/// mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// A store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Like [`FileStore::new`], but creates the directory up front.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(dir);
        std::fs::create_dir_all(&store.dir)?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        tracing::trace!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemquiz_core::storage::{load_progress, save_progress, PROGRESS_KEY, QUIZ_STATE_KEY};

    #[test]
    fn get_set_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert_eq!(store.get(QUIZ_STATE_KEY).unwrap(), None);
        store.set(QUIZ_STATE_KEY, "{\"a\":1}").unwrap();
        assert_eq!(
            store.get(QUIZ_STATE_KEY).unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(dir.path().join("data/gemquiz-quiz-state.json").exists());

        store.remove(QUIZ_STATE_KEY).unwrap();
        store.remove(QUIZ_STATE_KEY).unwrap();
        assert_eq!(store.get(QUIZ_STATE_KEY).unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        for key in ["", "../escape", "a/b", ".hidden", "with space"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "{key}");
            assert!(err.is_permanent());
        }
    }

    #[test]
    fn overwrite_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }

    #[test]
    fn progress_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = gemquiz_core::progress::UserProgress::default();
        progress.total_quizzes = 3;
        save_progress(&FileStore::new(dir.path()), &progress);

        let reopened = FileStore::new(dir.path());
        assert!(reopened.get(PROGRESS_KEY).unwrap().is_some());
        assert_eq!(load_progress(&reopened).total_quizzes, 3);
    }
}
