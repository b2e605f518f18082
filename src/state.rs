use std::path::PathBuf;
use std::sync::Arc;

use crate::mail::EmailQueue;
use crate::object_store::ObjectStore;
use crate::services::{FileStager, PaperWorkflow};
use crate::store::Store;

/// Shared handler state; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub emails: EmailQueue,
    pub papers: Arc<PaperWorkflow>,
    /// Directory served at `/files` when papers are kept on local disk
    pub files_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        objects: Arc<dyn ObjectStore>,
        emails: EmailQueue,
        staging_dir: PathBuf,
        register_url: &str,
    ) -> Self {
        let stager = FileStager::new(objects, staging_dir);
        let papers = PaperWorkflow::new(store.clone(), stager, emails.clone(), register_url);
        Self {
            store,
            emails,
            papers: Arc::new(papers),
            files_dir: None,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }

    pub fn with_files_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.files_dir = Some(dir.into());
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}
