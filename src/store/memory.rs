use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    Conference, NewConference, NewPaper, Paper, PaperChanges, PaperStatus, UpdateConference, User,
    CONFERENCE_STATUS_SUBMITTED,
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    conferences: Vec<Conference>,
    counters: HashMap<Uuid, i64>,
    papers: Vec<Paper>,
}

/// Process-local store. Each operation holds a single lock, so counter
/// increments and conflict checks are atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    /// Register an account, as the external account system would
    pub fn add_user(&self, fullname: &str, email: &str, verified: bool) -> StoreResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            fullname: fullname.to_string(),
            email: email.to_string(),
            affiliation: None,
            is_verified: verified,
            created_at: Utc::now(),
        };
        self.lock()?.users.push(user.clone());
        Ok(user)
    }

    /// Open a day-long session for `user_id` and return its bearer token
    pub fn add_session(&self, user_id: Uuid) -> StoreResult<String> {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        self.lock()?
            .sessions
            .insert(token.clone(), (user_id, Utc::now() + Duration::days(1)));
        Ok(token)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_verified_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.is_verified && u.email == email)
            .cloned())
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_user_by_session(&self, token: &str) -> StoreResult<Option<User>> {
        let inner = self.lock()?;
        let user_id = match inner.sessions.get(token) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => *user_id,
            _ => return Ok(None),
        };
        Ok(inner.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_conference_by_acronym(&self, acronym: &str) -> StoreResult<Option<Conference>> {
        Ok(self
            .lock()?
            .conferences
            .iter()
            .find(|c| c.acronym == acronym)
            .cloned())
    }

    async fn find_conference_by_id(&self, id: Uuid) -> StoreResult<Option<Conference>> {
        Ok(self
            .lock()?
            .conferences
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create_conference(&self, new: NewConference) -> StoreResult<Conference> {
        let mut inner = self.lock()?;
        if inner
            .conferences
            .iter()
            .any(|c| c.title == new.title || c.acronym == new.acronym)
        {
            return Err(StoreError::Conflict(
                "Conference already exists with this Title or Acronym".into(),
            ));
        }

        let now = Utc::now();
        let conference = Conference {
            id: Uuid::new_v4(),
            organizer_id: new.organizer_id,
            title: new.title,
            acronym: new.acronym,
            category: new.category,
            first_day: new.first_day,
            last_day: new.last_day,
            submissions_deadline: new.submissions_deadline,
            venue: new.venue,
            city: new.city,
            country: new.country,
            webpage: new.webpage,
            primary_area: new.primary_area,
            secondary_area: new.secondary_area,
            is_accepting_papers: true,
            status: CONFERENCE_STATUS_SUBMITTED.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.conferences.push(conference.clone());
        Ok(conference)
    }

    async fn update_conference(
        &self,
        acronym: &str,
        organizer_id: Uuid,
        update: UpdateConference,
    ) -> StoreResult<Option<Conference>> {
        let mut inner = self.lock()?;
        if let Some(title) = &update.conference_title {
            if inner
                .conferences
                .iter()
                .any(|c| &c.title == title && c.acronym != acronym)
            {
                return Err(StoreError::Conflict(
                    "Conference already exists with this Title".into(),
                ));
            }
        }

        Ok(inner
            .conferences
            .iter_mut()
            .find(|c| c.acronym == acronym && c.organizer_id == organizer_id)
            .map(|c| {
                c.apply(update);
                c.clone()
            }))
    }

    async fn list_conferences_by_organizer(
        &self,
        organizer_id: Uuid,
    ) -> StoreResult<Vec<Conference>> {
        Ok(self
            .lock()?
            .conferences
            .iter()
            .filter(|c| c.organizer_id == organizer_id)
            .cloned()
            .collect())
    }

    async fn next_paper_number(&self, conference_id: Uuid) -> StoreResult<i64> {
        let mut inner = self.lock()?;
        let counter = inner.counters.entry(conference_id).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn insert_paper(&self, new: NewPaper) -> StoreResult<Paper> {
        let mut inner = self.lock()?;
        if inner.papers.iter().any(|p| p.paper_id == new.paper_id) {
            return Err(StoreError::Conflict(format!(
                "Paper {} already exists",
                new.paper_id
            )));
        }

        let paper = Paper {
            id: Uuid::new_v4(),
            paper_id: new.paper_id,
            title: new.title,
            abstract_text: new.abstract_text,
            keywords: new.keywords,
            authors: new.authors,
            corresponding_authors: new.corresponding_authors,
            file_url: new.file_url,
            submitted_at: new.submitted_at,
            status: PaperStatus::Submitted,
            conference: new.conference_id,
            updated_at: new.submitted_at,
        };
        inner.papers.push(paper.clone());
        Ok(paper)
    }

    async fn find_paper(&self, paper_id: &str) -> StoreResult<Option<Paper>> {
        Ok(self
            .lock()?
            .papers
            .iter()
            .find(|p| p.paper_id == paper_id)
            .cloned())
    }

    async fn update_paper(
        &self,
        paper_id: &str,
        changes: PaperChanges,
    ) -> StoreResult<Option<Paper>> {
        Ok(self
            .lock()?
            .papers
            .iter_mut()
            .find(|p| p.paper_id == paper_id)
            .map(|p| {
                p.apply(changes);
                p.clone()
            }))
    }

    async fn set_paper_status(
        &self,
        conference_id: Uuid,
        paper_id: &str,
        status: PaperStatus,
    ) -> StoreResult<Option<Paper>> {
        Ok(self
            .lock()?
            .papers
            .iter_mut()
            .find(|p| p.conference == conference_id && p.paper_id == paper_id)
            .map(|p| {
                p.status = status;
                p.updated_at = Utc::now();
                p.clone()
            }))
    }

    async fn list_papers_by_conference(&self, conference_id: Uuid) -> StoreResult<Vec<Paper>> {
        Ok(self
            .lock()?
            .papers
            .iter()
            .filter(|p| p.conference == conference_id)
            .cloned()
            .collect())
    }

    async fn list_papers_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Paper>> {
        Ok(self
            .lock()?
            .papers
            .iter()
            .filter(|p| p.is_linked_to(user_id))
            .cloned()
            .collect())
    }

    async fn delete_papers(&self, conference_id: Uuid, paper_ids: &[String]) -> StoreResult<u64> {
        let mut inner = self.lock()?;
        let before = inner.papers.len();
        inner
            .papers
            .retain(|p| !(p.conference == conference_id && paper_ids.contains(&p.paper_id)));
        Ok((before - inner.papers.len()) as u64)
    }
}
