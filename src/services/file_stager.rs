use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::object_store::{ObjectStore, UploadError};
use crate::utils::{paper_number, sanitize_file_name};

/// A paper file received with a submission
#[derive(Debug, Clone)]
pub struct PaperFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Temporary copy of an upload; removed when dropped, whatever the outcome
struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove staged file");
            }
        }
    }
}

/// Writes uploads to a staging directory and pushes them to the object store.
pub struct FileStager {
    objects: Arc<dyn ObjectStore>,
    staging_dir: PathBuf,
}

impl FileStager {
    pub fn new(objects: Arc<dyn ObjectStore>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            objects,
            staging_dir: staging_dir.into(),
        }
    }

    /// `_<n>_<file name>`, where `n` is the sequence number of `paper_id`
    fn object_name(file: &PaperFile, paper_id: &str) -> String {
        let sequence = paper_number(paper_id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| paper_id.to_string());
        format!("_{}_{}", sequence, sanitize_file_name(&file.file_name))
    }

    /// Upload `file` for `paper_id` into the conference's scope and return
    /// its public URL. The staged copy is gone when this returns.
    pub async fn stage(
        &self,
        file: &PaperFile,
        paper_id: &str,
        acronym: &str,
    ) -> Result<String, UploadError> {
        let name = Self::object_name(file, paper_id);
        let dir = self.staging_dir.join(acronym);
        tokio::fs::create_dir_all(&dir).await?;

        let staged = StagedFile {
            path: dir.join(&name),
        };
        tokio::fs::write(staged.path(), &file.bytes).await?;

        let uploaded = self.objects.upload(staged.path(), &name, acronym).await?;
        let url = uploaded.secure_url.ok_or(UploadError::MissingUrl)?;

        tracing::info!(paper_id, url = %url, "Uploaded paper file");
        Ok(url)
    }

    /// Replace the file of an existing paper. The new file is uploaded
    /// first, then the previous object is removed; failing to remove it is
    /// logged and does not fail the edit.
    pub async fn restage(
        &self,
        file: &PaperFile,
        paper_id: &str,
        acronym: &str,
        previous_url: &str,
    ) -> Result<String, UploadError> {
        let url = self.stage(file, paper_id, acronym).await?;
        if !previous_url.is_empty() && !self.objects.is_same_object(previous_url, &url) {
            if let Err(e) = self.objects.delete(previous_url).await {
                tracing::warn!(paper_id, url = previous_url, error = %e, "Failed to delete previous paper file");
            }
        }
        Ok(url)
    }
}
