//! The document store.
//!
//! Owns a flat collection of documents keyed by file name, on top of any
//! [`StorageBackend`]. The store enforces existence and collision rules;
//! name validation ([`validate_name`](crate::document::validate_name)) is the
//! caller's job and runs before `create_empty` and `rename`.
//!
//! There is no locking: concurrent writers to the same document race and the
//! last write wins. Each write replaces the whole document atomically.

use std::sync::Arc;

use quill_storage::StorageBackend;
use tracing::debug;

use crate::document::copy_name;
use crate::error::DocumentError;

/// Directory-style store of text and markdown documents.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore").finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Create a store over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// List every document name, sorted lexicographically.
    ///
    /// Documents of any extension are listed, including ones that cannot be
    /// rendered.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Storage`] if the backend cannot be listed.
    pub async fn list(&self) -> Result<Vec<String>, DocumentError> {
        self.backend.list("").await.map_err(DocumentError::Storage)
    }

    /// Check whether a document exists.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidName`] for names that cannot address a
    /// document, or [`DocumentError::Storage`] if the backend fails.
    pub async fn exists(&self, name: &str) -> Result<bool, DocumentError> {
        self.backend
            .exists(name)
            .await
            .map_err(|e| DocumentError::from_storage(name, e))
    }

    /// Read the raw content of a document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if no such document exists.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, DocumentError> {
        self.backend
            .get(name)
            .await
            .map_err(|e| DocumentError::from_storage(name, e))?
            .ok_or_else(|| DocumentError::NotFound {
                name: name.to_owned(),
            })
    }

    /// Replace the whole content of a document, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidName`] or [`DocumentError::Storage`].
    pub async fn write(&self, name: &str, content: &[u8]) -> Result<(), DocumentError> {
        self.backend
            .put(name, content)
            .await
            .map_err(|e| DocumentError::from_storage(name, e))?;
        debug!(name, bytes = content.len(), "document written");
        Ok(())
    }

    /// Create a new, empty document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::AlreadyExists`] if the name is taken.
    pub async fn create_empty(&self, name: &str) -> Result<(), DocumentError> {
        if self.exists(name).await? {
            return Err(DocumentError::AlreadyExists {
                name: name.to_owned(),
            });
        }
        self.write(name, b"").await
    }

    /// Rename a document, keeping its content.
    ///
    /// The collision check runs against the current contents of the store,
    /// so renaming a document to its own name is a collision too.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if `old` does not exist, or
    /// [`DocumentError::AlreadyExists`] if `new` does.
    pub async fn rename(&self, old: &str, new: &str) -> Result<(), DocumentError> {
        if !self.exists(old).await? {
            return Err(DocumentError::NotFound {
                name: old.to_owned(),
            });
        }
        if self.exists(new).await? {
            return Err(DocumentError::AlreadyExists {
                name: new.to_owned(),
            });
        }
        self.backend
            .rename(old, new)
            .await
            .map_err(|e| DocumentError::from_storage(old, e))?;
        debug!(old, new, "document renamed");
        Ok(())
    }

    /// Copy a document to `{base}_copy{ext}` and return the new name.
    ///
    /// An existing document with the copy name is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if `name` does not exist.
    pub async fn duplicate(&self, name: &str) -> Result<String, DocumentError> {
        let content = self.read(name).await?;
        let copy = copy_name(name);
        self.write(&copy, &content).await?;
        debug!(name, copy = %copy, "document duplicated");
        Ok(copy)
    }

    /// Delete a document permanently.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if no such document exists.
    pub async fn delete(&self, name: &str) -> Result<(), DocumentError> {
        if !self.exists(name).await? {
            return Err(DocumentError::NotFound {
                name: name.to_owned(),
            });
        }
        self.backend
            .delete(name)
            .await
            .map_err(|e| DocumentError::from_storage(name, e))?;
        debug!(name, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quill_storage::{FsBackend, MemoryBackend};

    fn make_store() -> DocumentStore {
        DocumentStore::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn create_empty_then_read_is_empty() {
        let store = make_store();
        store.create_empty("notes.txt").await.unwrap();
        assert!(store.read("notes.txt").await.unwrap().is_empty());
        assert!(store.exists("notes.txt").await.unwrap());
    }

    #[tokio::test]
    async fn create_empty_rejects_existing_name() {
        let store = make_store();
        store.write("notes.txt", b"keep me").await.unwrap();

        let err = store.create_empty("notes.txt").await.unwrap_err();
        assert!(matches!(err, DocumentError::AlreadyExists { .. }));
        assert_eq!(err.to_string(), "notes.txt already exisits.");
        assert_eq!(store.read("notes.txt").await.unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn collisions_are_case_sensitive() {
        let store = make_store();
        store.create_empty("Notes.txt").await.unwrap();
        store.create_empty("notes.txt").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["Notes.txt", "notes.txt"]);
    }

    #[tokio::test]
    async fn write_replaces_content() {
        let store = make_store();
        store.write("changes.txt", b"old").await.unwrap();
        store.write("changes.txt", b"new content").await.unwrap();
        assert_eq!(store.read("changes.txt").await.unwrap(), b"new content");
    }

    #[tokio::test]
    async fn write_accepts_any_extension() {
        let store = make_store();
        store.write("legacy.rst", b"text").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["legacy.rst"]);
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let store = make_store();
        let err = store.read("notafile.txt").await.unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { .. }));
        assert_eq!(err.to_string(), "notafile.txt does not exist.");
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = make_store();
        store.write("gone.md", b"# bye").await.unwrap();
        store.delete("gone.md").await.unwrap();

        assert!(!store.exists("gone.md").await.unwrap());
        assert!(matches!(
            store.read("gone.md").await,
            Err(DocumentError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = make_store();
        let err = store.delete("ghost.md").await.unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { .. }));
    }

    #[tokio::test]
    async fn rename_moves_content() {
        let store = make_store();
        store.write("draft.md", b"# Draft").await.unwrap();
        store.rename("draft.md", "final.md").await.unwrap();

        assert!(!store.exists("draft.md").await.unwrap());
        assert_eq!(store.read("final.md").await.unwrap(), b"# Draft");
    }

    #[tokio::test]
    async fn rename_missing_source_is_not_found() {
        let store = make_store();
        let err = store.rename("ghost.md", "final.md").await.unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { ref name } if name == "ghost.md"));
    }

    #[tokio::test]
    async fn rename_onto_existing_name_is_rejected() {
        let store = make_store();
        store.write("a.txt", b"a").await.unwrap();
        store.write("b.txt", b"b").await.unwrap();

        let err = store.rename("a.txt", "b.txt").await.unwrap_err();
        assert!(matches!(err, DocumentError::AlreadyExists { ref name } if name == "b.txt"));
        assert_eq!(store.read("a.txt").await.unwrap(), b"a");
        assert_eq!(store.read("b.txt").await.unwrap(), b"b");
    }

    #[tokio::test]
    async fn rename_to_same_name_is_a_collision() {
        let store = make_store();
        store.write("a.txt", b"a").await.unwrap();
        let err = store.rename("a.txt", "a.txt").await.unwrap_err();
        assert!(matches!(err, DocumentError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn duplicate_copies_content_under_copy_name() {
        let store = make_store();
        store.write("about.md", b"# Ruby is...").await.unwrap();

        let copy = store.duplicate("about.md").await.unwrap();
        assert_eq!(copy, "about_copy.md");
        assert_eq!(store.read("about_copy.md").await.unwrap(), b"# Ruby is...");
        assert_eq!(store.read("about.md").await.unwrap(), b"# Ruby is...");
    }

    #[tokio::test]
    async fn duplicate_overwrites_existing_copy() {
        let store = make_store();
        store.write("about.md", b"fresh").await.unwrap();
        store.write("about_copy.md", b"stale").await.unwrap();

        store.duplicate("about.md").await.unwrap();
        assert_eq!(store.read("about_copy.md").await.unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn duplicate_missing_is_not_found() {
        let store = make_store();
        let err = store.duplicate("ghost.txt").await.unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { .. }));
    }

    #[tokio::test]
    async fn path_like_names_are_invalid() {
        let store = make_store();
        let err = store.read("../users.json").await.unwrap_err();
        assert!(matches!(err, DocumentError::InvalidName { .. }));
        let err = store.create_empty("sub/dir.txt").await.unwrap_err();
        assert!(matches!(err, DocumentError::InvalidName { .. }));
    }

    #[tokio::test]
    async fn hidden_names_cannot_be_created() {
        let store = make_store();
        let err = store.create_empty(".notes.txt").await.unwrap_err();
        assert_eq!(err.to_string(), ".notes.txt is not a valid file name.");
        store.create_empty("about.md").await.unwrap();
        let err = store.rename("about.md", ".about.md").await.unwrap_err();
        assert!(matches!(err, DocumentError::InvalidName { .. }));
        assert_eq!(store.list().await.unwrap(), vec!["about.md"]);
    }

    #[tokio::test]
    async fn works_over_a_real_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(Arc::new(FsBackend::open(dir.path()).unwrap()));

        store.create_empty("history.txt").await.unwrap();
        store.write("history.txt", b"Ruby 1.0 released.").await.unwrap();
        let copy = store.duplicate("history.txt").await.unwrap();
        store.rename(&copy, "timeline.txt").await.unwrap();
        store.delete("history.txt").await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["timeline.txt"]);
        assert_eq!(
            std::fs::read(dir.path().join("timeline.txt")).unwrap(),
            b"Ruby 1.0 released."
        );
    }
}
