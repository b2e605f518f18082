use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{ObjectStore, UploadError, UploadedObject};

/// Object store backed by a local directory, served under `/files`
pub struct DiskStore {
    root: PathBuf,
    public_base_url: String,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url_prefix(&self) -> String {
        format!("{}/files/", self.public_base_url)
    }

    /// Map a URL produced by this store back to its file, refusing anything
    /// that would escape the root directory.
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.strip_prefix(&self.url_prefix())?);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for DiskStore {
    async fn upload(
        &self,
        local_path: &Path,
        name: &str,
        scope: &str,
    ) -> Result<UploadedObject, UploadError> {
        let dir = self.root.join(scope);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::copy(local_path, dir.join(name)).await?;

        Ok(UploadedObject {
            secure_url: Some(format!("{}{}/{}", self.url_prefix(), scope, name)),
        })
    }

    async fn delete(&self, url: &str) -> Result<(), UploadError> {
        let path = self
            .path_for_url(url)
            .ok_or_else(|| UploadError::Rejected(format!("'{url}' is not managed by this store")))?;
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_delete() {
        let root = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let local = staging.path().join("_1_paper.pdf");
        std::fs::write(&local, b"%PDF-1.4").unwrap();

        let store = DiskStore::new(root.path(), "http://localhost:3000/");
        let uploaded = store.upload(&local, "_1_paper.pdf", "ABC").await.unwrap();
        let url = uploaded.secure_url.unwrap();
        assert_eq!(url, "http://localhost:3000/files/ABC/_1_paper.pdf");
        assert!(root.path().join("ABC/_1_paper.pdf").exists());

        store.delete(&url).await.unwrap();
        assert!(!root.path().join("ABC/_1_paper.pdf").exists());
    }

    #[tokio::test]
    async fn test_delete_rejects_foreign_urls() {
        let root = tempfile::tempdir().unwrap();
        let store = DiskStore::new(root.path(), "http://localhost:3000");

        let err = store
            .delete("http://elsewhere.example/files/ABC/x.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Rejected(_)));

        let err = store
            .delete("http://localhost:3000/files/../secret")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Rejected(_)));
    }
}
