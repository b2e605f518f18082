use std::collections::{HashMap, HashSet};

use askama::Template;
use futures::future::join_all;
use uuid::Uuid;

use crate::mail::templates::AuthorInvitationEmail;
use crate::mail::EmailQueue;
use crate::models::{AuthorDescriptor, PaperAuthor};
use crate::store::Store;

/// Author entries split the way they are stored on a paper
#[derive(Debug, Clone, Default)]
pub struct ResolvedAuthors {
    pub authors: Vec<PaperAuthor>,
    pub corresponding_authors: Vec<PaperAuthor>,
}

enum Lookup {
    Linked(Uuid),
    Unregistered,
    Failed,
}

/// Links submitted authors to verified accounts by email.
///
/// Every distinct email is looked up once, all lookups run concurrently.
/// Authors without an account get an invitation email. A failed lookup
/// leaves the author unlinked and sends nothing.
pub struct AuthorResolver<'a> {
    store: &'a dyn Store,
    emails: &'a EmailQueue,
    register_url: &'a str,
}

impl<'a> AuthorResolver<'a> {
    pub fn new(store: &'a dyn Store, emails: &'a EmailQueue, register_url: &'a str) -> Self {
        Self {
            store,
            emails,
            register_url,
        }
    }

    /// Resolve `descriptors` in submission order, partitioned on the
    /// corresponding-author flag.
    pub async fn resolve(
        &self,
        descriptors: &[AuthorDescriptor],
        paper_title: &str,
    ) -> ResolvedAuthors {
        let mut distinct: Vec<&str> = Vec::new();
        for descriptor in descriptors {
            let email = descriptor.email.trim();
            if !distinct.contains(&email) {
                distinct.push(email);
            }
        }

        let lookups = join_all(distinct.iter().map(|email| self.lookup(email))).await;
        let links: HashMap<&str, Lookup> = distinct.into_iter().zip(lookups).collect();

        let mut resolved = ResolvedAuthors::default();
        let mut invited = HashSet::new();
        for descriptor in descriptors {
            let email = descriptor.email.trim();
            let user_id = match links.get(email) {
                Some(Lookup::Linked(id)) => Some(*id),
                Some(Lookup::Unregistered) => {
                    if invited.insert(email) {
                        self.invite(email, descriptor.is_corresponding_author, paper_title);
                    }
                    None
                }
                Some(Lookup::Failed) | None => None,
            };

            let author = PaperAuthor::from_descriptor(descriptor, user_id);
            if descriptor.is_corresponding_author {
                resolved.corresponding_authors.push(author);
            } else {
                resolved.authors.push(author);
            }
        }
        resolved
    }

    async fn lookup(&self, email: &str) -> Lookup {
        match self.store.find_verified_user_by_email(email).await {
            Ok(Some(user)) => Lookup::Linked(user.id),
            Ok(None) => Lookup::Unregistered,
            Err(e) => {
                tracing::warn!(email, error = %e, "Author lookup failed, leaving author unlinked");
                Lookup::Failed
            }
        }
    }

    fn invite(&self, email: &str, is_corresponding: bool, paper_title: &str) {
        let invitation = AuthorInvitationEmail {
            email,
            paper_title,
            is_corresponding,
            register_url: self.register_url,
        };
        match invitation.render() {
            Ok(html) => self.emails.enqueue(email, invitation.subject(), html),
            Err(e) => tracing::warn!(email, error = %e, "Failed to render invitation email"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::OutboxMailer;
    use crate::models::{
        Conference, NewConference, NewPaper, Paper, PaperChanges, PaperStatus, UpdateConference,
        User,
    };
    use crate::store::{MemoryStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    /// Memory store whose user lookup fails for one address
    struct FailingLookup {
        inner: MemoryStore,
        broken_email: &'static str,
    }

    #[async_trait]
    impl Store for FailingLookup {
        async fn find_verified_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
            if email == self.broken_email {
                return Err(StoreError::Backend("connection reset".into()));
            }
            self.inner.find_verified_user_by_email(email).await
        }

        async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
            self.inner.find_users_by_ids(ids).await
        }

        async fn find_user_by_session(&self, token: &str) -> StoreResult<Option<User>> {
            self.inner.find_user_by_session(token).await
        }

        async fn find_conference_by_acronym(
            &self,
            acronym: &str,
        ) -> StoreResult<Option<Conference>> {
            self.inner.find_conference_by_acronym(acronym).await
        }

        async fn find_conference_by_id(&self, id: Uuid) -> StoreResult<Option<Conference>> {
            self.inner.find_conference_by_id(id).await
        }

        async fn create_conference(&self, conference: NewConference) -> StoreResult<Conference> {
            self.inner.create_conference(conference).await
        }

        async fn update_conference(
            &self,
            acronym: &str,
            organizer_id: Uuid,
            update: UpdateConference,
        ) -> StoreResult<Option<Conference>> {
            self.inner.update_conference(acronym, organizer_id, update).await
        }

        async fn list_conferences_by_organizer(
            &self,
            organizer_id: Uuid,
        ) -> StoreResult<Vec<Conference>> {
            self.inner.list_conferences_by_organizer(organizer_id).await
        }

        async fn next_paper_number(&self, conference_id: Uuid) -> StoreResult<i64> {
            self.inner.next_paper_number(conference_id).await
        }

        async fn insert_paper(&self, paper: NewPaper) -> StoreResult<Paper> {
            self.inner.insert_paper(paper).await
        }

        async fn find_paper(&self, paper_id: &str) -> StoreResult<Option<Paper>> {
            self.inner.find_paper(paper_id).await
        }

        async fn update_paper(
            &self,
            paper_id: &str,
            changes: PaperChanges,
        ) -> StoreResult<Option<Paper>> {
            self.inner.update_paper(paper_id, changes).await
        }

        async fn set_paper_status(
            &self,
            conference_id: Uuid,
            paper_id: &str,
            status: PaperStatus,
        ) -> StoreResult<Option<Paper>> {
            self.inner.set_paper_status(conference_id, paper_id, status).await
        }

        async fn list_papers_by_conference(&self, conference_id: Uuid) -> StoreResult<Vec<Paper>> {
            self.inner.list_papers_by_conference(conference_id).await
        }

        async fn list_papers_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Paper>> {
            self.inner.list_papers_by_user(user_id).await
        }

        async fn delete_papers(
            &self,
            conference_id: Uuid,
            paper_ids: &[String],
        ) -> StoreResult<u64> {
            self.inner.delete_papers(conference_id, paper_ids).await
        }
    }

    fn descriptor(name: &str, email: &str, corresponding: bool) -> AuthorDescriptor {
        AuthorDescriptor {
            name: name.to_string(),
            email: email.to_string(),
            is_corresponding_author: corresponding,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_links_registered_and_invites_the_rest() {
        let store = MemoryStore::new();
        let alice = store.add_user("Alice", "alice@example.com", true).unwrap();
        store.add_user("Pending", "pending@example.com", false).unwrap();
        let outbox = Arc::new(OutboxMailer::new());
        let (queue, _worker) = EmailQueue::start(outbox.clone(), "conference@example.org");
        let resolver = AuthorResolver::new(&store, &queue, "https://example.org/sign-up");

        let descriptors = vec![
            descriptor("Alice", "alice@example.com", true),
            descriptor("Bob", "bob@example.com", false),
            descriptor("Pending", "pending@example.com", false),
            descriptor("Bob again", "bob@example.com", false),
        ];
        let resolved = resolver.resolve(&descriptors, "A Study").await;

        assert_eq!(resolved.corresponding_authors.len(), 1);
        assert_eq!(resolved.corresponding_authors[0].user_id, Some(alice.id));

        let names: Vec<&str> = resolved.authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Bob", "Pending", "Bob again"]);
        assert!(resolved.authors.iter().all(|a| a.user_id.is_none()));

        outbox.wait_for(2, Duration::from_secs(2)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let mut recipients: Vec<String> = outbox.sent().into_iter().map(|e| e.to).collect();
        recipients.sort();
        assert_eq!(recipients, ["bob@example.com", "pending@example.com"]);
    }

    #[tokio::test]
    async fn test_failed_lookup_leaves_author_unlinked() {
        let inner = MemoryStore::new();
        let alice = inner.add_user("Alice", "alice@example.com", true).unwrap();
        let store = FailingLookup {
            inner,
            broken_email: "broken@example.com",
        };
        let outbox = Arc::new(OutboxMailer::new());
        let (queue, _worker) = EmailQueue::start(outbox.clone(), "conference@example.org");
        let resolver = AuthorResolver::new(&store, &queue, "https://example.org/sign-up");

        let descriptors = vec![
            descriptor("Broken", " broken@example.com", false),
            descriptor("Alice", "alice@example.com", false),
            descriptor("Carol", "carol@example.com", false),
        ];
        let resolved = resolver.resolve(&descriptors, "A Study").await;

        let names: Vec<&str> = resolved.authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Broken", "Alice", "Carol"]);
        assert_eq!(resolved.authors[0].user_id, None);
        assert_eq!(resolved.authors[1].user_id, Some(alice.id));
        assert_eq!(resolved.authors[2].user_id, None);

        outbox.wait_for(1, Duration::from_secs(2)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let recipients: Vec<String> = outbox.sent().into_iter().map(|e| e.to).collect();
        assert_eq!(recipients, ["carol@example.com"]);
    }

    #[tokio::test]
    async fn test_no_authors_resolves_to_nothing() {
        let store = MemoryStore::new();
        let outbox = Arc::new(OutboxMailer::new());
        let (queue, _worker) = EmailQueue::start(outbox.clone(), "conference@example.org");
        let resolver = AuthorResolver::new(&store, &queue, "https://example.org/sign-up");

        let resolved = resolver.resolve(&[], "Untitled").await;
        assert!(resolved.authors.is_empty());
        assert!(resolved.corresponding_authors.is_empty());
    }
}
