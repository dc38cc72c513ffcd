//! Filesystem storage backend, the production default.
//!
//! Each key is one regular file directly inside the root directory; there
//! are no subdirectories. All operations are dispatched to a blocking thread
//! via [`tokio::task::spawn_blocking`] since `std::fs` is synchronous.
//!
//! Writes go to a hidden temporary file in the same directory which is then
//! renamed over the target, so readers never observe a torn file. Keys never
//! start with `.`, so hidden entries (temporary files, dotfiles) are skipped
//! when listing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::{StorageBackend, StorageError, check_key};

/// A storage backend backed by a flat directory.
///
/// Cheap to clone and safe to share across async tasks.
///
/// # Examples
///
/// ```no_run
/// # use quill_storage::FsBackend;
/// let backend = FsBackend::open("./data").unwrap();
/// ```
#[derive(Clone)]
pub struct FsBackend {
    root: Arc<PathBuf>,
}

impl std::fmt::Debug for FsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsBackend")
            .field("root", &self.root)
            .finish()
    }
}

impl FsBackend {
    /// Open a directory-backed store rooted at the given path.
    ///
    /// Creates the directory (and its parents) if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory cannot be created or
    /// the path exists but is not a directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| StorageError::Open {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;
        if !root.is_dir() {
            return Err(StorageError::Open {
                path: root.display().to_string(),
                reason: "not a directory".to_owned(),
            });
        }

        Ok(Self {
            root: Arc::new(root.to_path_buf()),
        })
    }

    /// Return the directory this backend stores its files in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.root.join(key))
    }
}

/// Run a blocking filesystem closure on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, StorageError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Read {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
}

/// Write `value` to `target` through a temporary sibling file.
fn write_atomic(root: &Path, key: &str, target: &Path, value: &[u8]) -> Result<(), StorageError> {
    // Fixed-length name so long keys still fit the file name limit.
    let tmp = root.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
    std::fs::write(&tmp, value).map_err(|e| StorageError::Write {
        key: key.to_owned(),
        reason: e.to_string(),
    })?;
    if let Err(e) = std::fs::rename(&tmp, target) {
        let _ = std::fs::remove_file(&tmp);
        return Err(StorageError::Write {
            key: key.to_owned(),
            reason: e.to_string(),
        });
    }
    Ok(())
}

#[async_trait::async_trait]
impl StorageBackend for FsBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        let key = key.to_owned();
        blocking(move || match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key,
                reason: e.to_string(),
            }),
        })
        .await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let root = Arc::clone(&self.root);
        let key = key.to_owned();
        let value = value.to_vec();
        blocking(move || write_atomic(&root, &key, &path, &value)).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let key = key.to_owned();
        blocking(move || match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Delete {
                key,
                reason: e.to_string(),
            }),
        })
        .await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let root = Arc::clone(&self.root);
        let prefix = prefix.to_owned();
        blocking(move || {
            let list_err = |e: std::io::Error| StorageError::List {
                prefix: prefix.clone(),
                reason: e.to_string(),
            };

            let mut keys = Vec::new();
            for entry in std::fs::read_dir(root.as_path()).map_err(list_err)? {
                let entry = entry.map_err(list_err)?;
                if !entry.file_type().map_err(list_err)?.is_file() {
                    continue;
                }
                let Ok(name) = entry.file_name().into_string() else {
                    warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
                    continue;
                };
                if name.starts_with('.') || !name.starts_with(&prefix) {
                    continue;
                }
                keys.push(name);
            }
            keys.sort();
            Ok(keys)
        })
        .await
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let from_path = self.path_for(from)?;
        let to_path = self.path_for(to)?;
        let from = from.to_owned();
        let to = to.to_owned();
        blocking(move || {
            if !from_path.is_file() {
                return Err(StorageError::Missing { key: from });
            }
            std::fs::rename(&from_path, &to_path).map_err(|e| StorageError::Rename {
                from,
                to,
                reason: e.to_string(),
            })
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        let key = key.to_owned();
        blocking(move || match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Read {
                key,
                reason: e.to_string(),
            }),
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn make_backend() -> (tempfile::TempDir, FsBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        (dir, backend)
    }

    #[tokio::test]
    async fn open_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("data");
        let backend = FsBackend::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root.as_path());
    }

    #[tokio::test]
    async fn open_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data");
        std::fs::write(&file, b"").unwrap();
        let result = FsBackend::open(&file);
        assert!(matches!(result, Err(StorageError::Open { .. })));
    }

    #[tokio::test]
    async fn put_writes_a_plain_file() {
        let (dir, backend) = make_backend();
        backend.put("history.txt", b"Ruby 1.0 released.").await.unwrap();

        let on_disk = std::fs::read(dir.path().join("history.txt")).unwrap();
        assert_eq!(on_disk, b"Ruby 1.0 released.");
        assert_eq!(
            backend.get("history.txt").await.unwrap(),
            Some(b"Ruby 1.0 released.".to_vec())
        );
    }

    #[tokio::test]
    async fn put_leaves_no_temporary_files() {
        let (dir, backend) = make_backend();
        backend.put("a.txt", b"1").await.unwrap();
        backend.put("a.txt", b"2").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["a.txt"]);
    }

    #[tokio::test]
    async fn long_names_are_written_in_place() {
        let (dir, backend) = make_backend();
        let name = format!("{}.txt", "a".repeat(246));
        assert_eq!(name.len(), 250);

        backend.put(&name, b"long").await.unwrap();
        backend.put(&name, b"longer").await.unwrap();

        assert_eq!(backend.get(&name).await.unwrap(), Some(b"longer".to_vec()));
        assert_eq!(backend.list("").await.unwrap(), vec![name]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn hidden_names_are_rejected() {
        let (dir, backend) = make_backend();
        let result = backend.put(".notes.txt", b"x").await;
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
        assert!(!dir.path().join(".notes.txt").exists());
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (_dir, backend) = make_backend();
        assert_eq!(backend.get("nope.md").await.unwrap(), None);
        assert!(!backend.exists("nope.md").await.unwrap());
    }

    #[tokio::test]
    async fn list_is_sorted_and_skips_hidden_and_directories() {
        let (dir, backend) = make_backend();
        backend.put("history.txt", b"").await.unwrap();
        backend.put("about.md", b"").await.unwrap();
        backend.put("changes.txt", b"").await.unwrap();
        std::fs::write(dir.path().join(".DS_Store"), b"").unwrap();
        std::fs::create_dir(dir.path().join("archive")).unwrap();

        let keys = backend.list("").await.unwrap();
        assert_eq!(keys, vec!["about.md", "changes.txt", "history.txt"]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, backend) = make_backend();
        backend.put("gone.txt", b"x").await.unwrap();
        backend.delete("gone.txt").await.unwrap();
        backend.delete("gone.txt").await.unwrap();
        assert!(!backend.exists("gone.txt").await.unwrap());
    }

    #[tokio::test]
    async fn rename_moves_the_file() {
        let (dir, backend) = make_backend();
        backend.put("draft.md", b"# Title").await.unwrap();
        backend.rename("draft.md", "final.md").await.unwrap();

        assert!(!dir.path().join("draft.md").exists());
        assert_eq!(
            backend.get("final.md").await.unwrap(),
            Some(b"# Title".to_vec())
        );
    }

    #[tokio::test]
    async fn rename_missing_source_fails() {
        let (_dir, backend) = make_backend();
        let result = backend.rename("ghost.md", "final.md").await;
        assert!(matches!(result, Err(StorageError::Missing { .. })));
    }

    #[tokio::test]
    async fn traversal_keys_never_touch_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let backend = FsBackend::open(&data).unwrap();
        std::fs::write(dir.path().join("users.json"), b"{}").unwrap();

        let result = backend.get("../users.json").await;
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
        let result = backend.delete("..").await;
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
    }
}
