use std::sync::Arc;

use askama::Template;
use chrono::Utc;

use super::authors::AuthorResolver;
use super::file_stager::{FileStager, PaperFile};
use super::paper_id::generate_paper_id;
use crate::error::AppError;
use crate::mail::templates::{format_date, format_time, PaperSubmissionEmail};
use crate::mail::EmailQueue;
use crate::models::{AuthorDescriptor, Conference, NewPaper, Paper, PaperChanges, User};
use crate::store::Store;

pub const CONFERENCE_NOT_FOUND: &str =
    "The conference is not available in the database. Please check the URL again.";

/// A new paper as received from the submission form
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub title: String,
    pub abstract_text: String,
    pub keywords: Vec<String>,
    /// Acronym of the target conference
    pub conference: String,
    pub file: Option<PaperFile>,
    pub authors: Vec<AuthorDescriptor>,
}

/// Edit of an existing paper; `None` keeps the stored value. Authors are
/// always replaced.
#[derive(Debug, Clone, Default)]
pub struct PaperEdit {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub file: Option<PaperFile>,
    pub authors: Vec<AuthorDescriptor>,
}

fn require_authors(authors: &[AuthorDescriptor]) -> Result<(), AppError> {
    if authors.is_empty() {
        return Err(AppError::validation("Please add at least yourself as Author"));
    }
    if authors.iter().any(|a| a.email.trim().is_empty()) {
        return Err(AppError::validation("Every author needs an email address"));
    }
    Ok(())
}

/// Submission and editing of papers.
///
/// Ties the author resolver, the paper ID counter and the file stager
/// together and persists the result.
pub struct PaperWorkflow {
    store: Arc<dyn Store>,
    stager: FileStager,
    emails: EmailQueue,
    register_url: String,
}

impl PaperWorkflow {
    pub fn new(
        store: Arc<dyn Store>,
        stager: FileStager,
        emails: EmailQueue,
        register_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            stager,
            emails,
            register_url: register_url.into(),
        }
    }

    fn resolver(&self) -> AuthorResolver<'_> {
        AuthorResolver::new(self.store.as_ref(), &self.emails, &self.register_url)
    }

    pub async fn submit(&self, submission: Submission) -> Result<Paper, AppError> {
        let file = submission
            .file
            .as_ref()
            .filter(|f| !f.bytes.is_empty())
            .ok_or_else(|| AppError::validation("File is required"))?;
        require_authors(&submission.authors)?;

        let conference = self
            .store
            .find_conference_by_acronym(submission.conference.trim())
            .await?
            .ok_or_else(|| AppError::not_found(CONFERENCE_NOT_FOUND))?;
        if !conference.is_accepting_papers {
            return Err(AppError::validation(format!(
                "{} is not accepting papers",
                conference.acronym
            )));
        }

        let title = submission.title.trim();
        let resolved = self.resolver().resolve(&submission.authors, title).await;
        let paper_id = generate_paper_id(self.store.as_ref(), &conference).await?;
        let file_url = self.stager.stage(file, &paper_id, &conference.acronym).await?;

        let paper = self
            .store
            .insert_paper(NewPaper {
                paper_id,
                conference_id: conference.id,
                title: title.to_string(),
                abstract_text: submission.abstract_text.trim().to_string(),
                keywords: submission.keywords,
                authors: resolved.authors,
                corresponding_authors: resolved.corresponding_authors,
                file_url,
                submitted_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            paper_id = %paper.paper_id,
            conference = %conference.acronym,
            authors = paper.all_authors().count(),
            "Paper submitted"
        );
        self.send_confirmations(&paper, &conference);
        Ok(paper)
    }

    /// One confirmation per author, regular authors first
    fn send_confirmations(&self, paper: &Paper, conference: &Conference) {
        let submission_date = format_date(&paper.submitted_at);
        let submission_time = format_time(&paper.submitted_at);

        for author in paper.all_authors() {
            let email = PaperSubmissionEmail {
                username: &author.name,
                paper_id: &paper.paper_id,
                paper_title: &paper.title,
                conference_name: &conference.acronym,
                submission_date: &submission_date,
                submission_time: &submission_time,
            };
            match email.render() {
                Ok(html) => self.emails.enqueue(&author.email, email.subject(), html),
                Err(e) => tracing::warn!(
                    to = %author.email,
                    error = %e,
                    "Failed to render submission email"
                ),
            }
        }
    }

    /// Edit a paper on behalf of `user`, who must be a linked author of the
    /// paper or the organizer of its conference.
    pub async fn update(
        &self,
        user: &User,
        paper_id: &str,
        edit: PaperEdit,
    ) -> Result<Paper, AppError> {
        require_authors(&edit.authors)?;

        let paper = self
            .store
            .find_paper(paper_id)
            .await?
            .ok_or_else(|| AppError::not_found("Paper not found"))?;
        let conference = self
            .store
            .find_conference_by_id(paper.conference)
            .await?
            .ok_or_else(|| AppError::not_found(CONFERENCE_NOT_FOUND))?;

        if !paper.is_linked_to(user.id) && conference.organizer_id != user.id {
            return Err(AppError::Forbidden(
                "You are not allowed to edit this paper".into(),
            ));
        }

        let title = edit
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);
        let resolved = self
            .resolver()
            .resolve(&edit.authors, title.as_deref().unwrap_or(&paper.title))
            .await;

        let file_url = match edit.file.as_ref().filter(|f| !f.bytes.is_empty()) {
            Some(file) => Some(
                self.stager
                    .restage(file, &paper.paper_id, &conference.acronym, &paper.file_url)
                    .await?,
            ),
            None => None,
        };

        let changes = PaperChanges {
            title,
            abstract_text: edit
                .abstract_text
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            keywords: edit.keywords,
            authors: Some(resolved.authors),
            corresponding_authors: Some(resolved.corresponding_authors),
            file_url,
        };

        let updated = self
            .store
            .update_paper(&paper.paper_id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("Paper not found"))?;

        tracing::info!(paper_id = %updated.paper_id, editor = %user.id, "Paper updated");
        Ok(updated)
    }
}
