use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::ObjectStore;

/// Public disk on the local filesystem, served under a URL prefix.
pub struct LocalDiskStore {
    root: PathBuf,
    public_url: String,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    /// Map `key` below the root, refusing anything that could escape it.
    fn path_for(&self, key: &str) -> Result<PathBuf, String> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(format!("Invalid storage key: {key}"));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalDiskStore {
    async fn put(&self, key: &str, _content_type: &str, body: Vec<u8>) -> Result<(), String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    async fn exists(&self, key: &str) -> Result<bool, String> {
        let path = self.path_for(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| format!("Failed to stat {}: {}", path.display(), e))
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("Failed to delete {}: {}", path.display(), e)),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_exists_delete_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path(), "/storage");

        store.put("tags/a.png", "image/png", vec![1, 2, 3]).await.unwrap();
        assert!(store.exists("tags/a.png").await.unwrap());
        assert_eq!(std::fs::read(dir.path().join("tags/a.png")).unwrap(), vec![1, 2, 3]);

        store.delete("tags/a.png").await.unwrap();
        assert!(!store.exists("tags/a.png").await.unwrap());
        // Second delete is a no-op.
        store.delete("tags/a.png").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_keys_escaping_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path(), "/storage");
        assert!(store.put("../evil.png", "image/png", vec![]).await.is_err());
        assert!(store.exists("/etc/passwd").await.is_err());
        assert!(store.delete("").await.is_err());
    }

    #[test]
    fn public_url_joins_prefix() {
        let store = LocalDiskStore::new("/tmp/x", "https://cdn.example/storage/");
        assert_eq!(
            store.public_url("people/p.jpg"),
            "https://cdn.example/storage/people/p.jpg"
        );
    }
}
