//! Storage boundary for users, conferences and papers.
//!
//! [`PgStore`] is the production backend; [`MemoryStore`] backs tests and
//! local runs without a database.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Conference, NewConference, NewPaper, Paper, PaperChanges, PaperStatus, UpdateConference, User,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Verified account with exactly this email
    async fn find_verified_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    /// User owning an unexpired session token
    async fn find_user_by_session(&self, token: &str) -> StoreResult<Option<User>>;

    async fn find_conference_by_acronym(&self, acronym: &str) -> StoreResult<Option<Conference>>;

    async fn find_conference_by_id(&self, id: Uuid) -> StoreResult<Option<Conference>>;

    /// Fails with [`StoreError::Conflict`] when the title or acronym is taken
    async fn create_conference(&self, conference: NewConference) -> StoreResult<Conference>;

    /// Partial update of a conference owned by `organizer_id`
    async fn update_conference(
        &self,
        acronym: &str,
        organizer_id: Uuid,
        update: UpdateConference,
    ) -> StoreResult<Option<Conference>>;

    async fn list_conferences_by_organizer(&self, organizer_id: Uuid)
        -> StoreResult<Vec<Conference>>;

    /// Atomically increment and return the paper counter of a conference.
    /// The first call for a conference returns 1.
    async fn next_paper_number(&self, conference_id: Uuid) -> StoreResult<i64>;

    async fn insert_paper(&self, paper: NewPaper) -> StoreResult<Paper>;

    async fn find_paper(&self, paper_id: &str) -> StoreResult<Option<Paper>>;

    async fn update_paper(&self, paper_id: &str, changes: PaperChanges)
        -> StoreResult<Option<Paper>>;

    async fn set_paper_status(
        &self,
        conference_id: Uuid,
        paper_id: &str,
        status: PaperStatus,
    ) -> StoreResult<Option<Paper>>;

    async fn list_papers_by_conference(&self, conference_id: Uuid) -> StoreResult<Vec<Paper>>;

    /// Papers where `user_id` is linked to any author entry
    async fn list_papers_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Paper>>;

    /// Delete the listed papers of a conference, returning how many went away
    async fn delete_papers(&self, conference_id: Uuid, paper_ids: &[String]) -> StoreResult<u64>;
}
