//! Organizer review of submitted papers and the spreadsheet export.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::conferences::find_organized_conference;
use crate::error::AppError;
use crate::models::{
    AuthoredPaper, Conference, Paper, PaperStatus, PopulatedAuthor, PopulatedPaper, User,
};
use crate::store::Store;
use crate::utils::{paper_number, select_in_ranges, validate_ranges, PaperRange};

const NOT_AVAILABLE: &str = "N/A";

/// Expand the author account links of `papers` with one batched user lookup
pub async fn populate_papers(
    store: &dyn Store,
    papers: Vec<Paper>,
) -> Result<Vec<PopulatedPaper>, AppError> {
    let mut ids: Vec<Uuid> = papers
        .iter()
        .flat_map(Paper::all_authors)
        .filter_map(|a| a.user_id)
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let users: HashMap<Uuid, User> = if ids.is_empty() {
        HashMap::new()
    } else {
        store
            .find_users_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    Ok(papers
        .into_iter()
        .map(|p| PopulatedPaper::new(p, &users))
        .collect())
}

/// Papers of a conference ordered by their number
async fn sorted_papers(store: &dyn Store, conference: &Conference) -> Result<Vec<Paper>, AppError> {
    let mut papers = store.list_papers_by_conference(conference.id).await?;
    papers.sort_by_key(|p| (paper_number(&p.paper_id).unwrap_or(u64::MAX), p.submitted_at));
    Ok(papers)
}

pub async fn conference_papers(
    store: &dyn Store,
    organizer: &User,
    acronym: &str,
) -> Result<(Conference, Vec<PopulatedPaper>), AppError> {
    let conference = find_organized_conference(store, organizer, acronym).await?;
    let papers = sorted_papers(store, &conference).await?;
    let papers = populate_papers(store, papers).await?;
    Ok((conference, papers))
}

pub async fn delete_papers(
    store: &dyn Store,
    organizer: &User,
    acronym: &str,
    paper_ids: &[String],
) -> Result<u64, AppError> {
    if paper_ids.is_empty() {
        return Err(AppError::validation("No papers selected for deletion"));
    }
    let conference = find_organized_conference(store, organizer, acronym).await?;
    let deleted = store.delete_papers(conference.id, paper_ids).await?;
    tracing::info!(acronym, requested = paper_ids.len(), deleted, "Papers deleted");
    Ok(deleted)
}

pub async fn set_status(
    store: &dyn Store,
    organizer: &User,
    acronym: &str,
    paper_id: &str,
    status: PaperStatus,
) -> Result<Paper, AppError> {
    let conference = find_organized_conference(store, organizer, acronym).await?;
    let paper = store
        .set_paper_status(conference.id, paper_id, status)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Paper {paper_id} not found in {acronym}")))?;
    tracing::info!(paper_id, %status, "Paper status changed");
    Ok(paper)
}

/// One spreadsheet row per paper
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExportRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "PaperID")]
    pub paper_id: String,
    #[serde(rename = "PaperTitle")]
    pub title: String,
    #[serde(rename = "Abstract")]
    pub abstract_text: String,
    #[serde(rename = "Keywords")]
    pub keywords: String,
    #[serde(rename = "CorrespondingAuthor")]
    pub corresponding_author_names: String,
    #[serde(rename = "EmailID")]
    pub corresponding_author_emails: String,
    #[serde(rename = "Affiliation")]
    pub corresponding_author_affiliations: String,
    #[serde(rename = "AllAuthors")]
    pub author_names: String,
    #[serde(rename = "AllAuthorEmails")]
    pub author_emails: String,
    #[serde(rename = "AllAuthorAffiliations")]
    pub author_affiliations: String,
}

fn or_not_available(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(NOT_AVAILABLE)
}

/// Names, emails and affiliations of `authors`, each comma separated.
/// Data of the linked account wins over what the submitter typed.
fn author_columns<'a>(authors: impl Iterator<Item = &'a PopulatedAuthor>) -> [String; 3] {
    let mut names = Vec::new();
    let mut emails = Vec::new();
    let mut affiliations = Vec::new();
    for author in authors {
        let user = author.user.as_ref();
        names.push(user.map_or(author.name.as_str(), |u| u.fullname.as_str()));
        emails.push(or_not_available(
            user.map(|u| u.email.as_str()).or(Some(author.email.as_str())),
        ));
        affiliations.push(or_not_available(
            user.and_then(|u| u.affiliation.as_deref())
                .or(Some(author.affiliation.as_str())),
        ));
    }
    [names.join(", "), emails.join(", "), affiliations.join(", ")]
}

impl From<&PopulatedPaper> for ExportRow {
    fn from(paper: &PopulatedPaper) -> Self {
        let [corresponding_author_names, corresponding_author_emails, corresponding_author_affiliations] =
            author_columns(paper.corresponding_authors.iter());
        let [author_names, author_emails, author_affiliations] =
            author_columns(paper.authors.iter().chain(paper.corresponding_authors.iter()));

        Self {
            timestamp: paper
                .submitted_at
                .format("%B %-d %Y, %-I:%M:%S %P")
                .to_string(),
            paper_id: paper.paper_id.clone(),
            title: paper.title.clone(),
            abstract_text: paper.abstract_text.clone(),
            keywords: paper.keywords.join(", "),
            corresponding_author_names,
            corresponding_author_emails,
            corresponding_author_affiliations,
            author_names,
            author_emails,
            author_affiliations,
        }
    }
}

/// Export rows for the papers of a conference, limited to `ranges` when any
/// are given.
pub async fn export_papers(
    store: &dyn Store,
    organizer: &User,
    acronym: &str,
    ranges: &[PaperRange],
) -> Result<Vec<ExportRow>, AppError> {
    validate_ranges(ranges).map_err(|e| AppError::validation(e.to_string()))?;

    let conference = find_organized_conference(store, organizer, acronym).await?;
    let mut papers = sorted_papers(store, &conference).await?;
    if !ranges.is_empty() {
        papers = select_in_ranges(papers, ranges, |p| p.paper_id.as_str());
    }
    let papers = populate_papers(store, papers).await?;
    Ok(papers.iter().map(ExportRow::from).collect())
}

/// Papers where `user` is a linked author, each with its conference acronym
pub async fn own_papers(store: &dyn Store, user: &User) -> Result<Vec<AuthoredPaper>, AppError> {
    let papers = store.list_papers_by_user(user.id).await?;

    let mut acronyms: HashMap<Uuid, Option<String>> = HashMap::new();
    for paper in &papers {
        if !acronyms.contains_key(&paper.conference) {
            let acronym = store
                .find_conference_by_id(paper.conference)
                .await?
                .map(|c| c.acronym);
            acronyms.insert(paper.conference, acronym);
        }
    }

    Ok(papers
        .into_iter()
        .map(|paper| AuthoredPaper {
            conference_acronym: acronyms.get(&paper.conference).cloned().flatten(),
            paper,
        })
        .collect())
}
