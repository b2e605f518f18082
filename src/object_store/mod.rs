//! Remote object storage for uploaded paper files.

mod cloudinary;
mod disk;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};
pub use disk::DiskStore;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("File is unable to upload to object storage")]
    MissingUrl,

    #[error("Object storage rejected the request: {0}")]
    Rejected(String),

    #[error("Object storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("File staging failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a successful upload call
#[derive(Debug, Clone)]
pub struct UploadedObject {
    /// Publicly resolvable URL; `None` when the store did not report one
    pub secure_url: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `local_path` as `name` inside `scope`
    async fn upload(
        &self,
        local_path: &Path,
        name: &str,
        scope: &str,
    ) -> Result<UploadedObject, UploadError>;

    /// Remove an object previously returned by [`ObjectStore::upload`]
    async fn delete(&self, url: &str) -> Result<(), UploadError>;

    /// Whether two URLs returned by this store name the same object
    fn is_same_object(&self, a: &str, b: &str) -> bool {
        a == b
    }
}
