use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{User, UserSummary};

/// Review state of a submitted paper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaperStatus {
    Submitted,
    Accepted,
    Rejected,
}

impl PaperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperStatus::Submitted => "submitted",
            PaperStatus::Accepted => "accepted",
            PaperStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PaperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(PaperStatus::Submitted),
            "accepted" => Ok(PaperStatus::Accepted),
            "rejected" => Ok(PaperStatus::Rejected),
            other => Err(format!("unknown paper status '{other}'")),
        }
    }
}

/// Author as declared by the submitter in the `paperAuthors` form field
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDescriptor {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default, alias = "WebPage")]
    pub web_page: Option<String>,
    #[serde(default)]
    pub is_corresponding_author: bool,
}

/// Author entry stored on a paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperAuthor {
    pub name: String,
    pub email: String,
    pub affiliation: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_page: Option<String>,
    /// Present only when the email matches a verified account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub is_corresponding_author: bool,
}

impl PaperAuthor {
    pub fn from_descriptor(descriptor: &AuthorDescriptor, user_id: Option<Uuid>) -> Self {
        Self {
            name: descriptor.name.clone(),
            email: descriptor.email.trim().to_string(),
            affiliation: descriptor.affiliation.clone(),
            country: descriptor.country.clone(),
            web_page: descriptor.web_page.clone(),
            user_id,
            is_corresponding_author: descriptor.is_corresponding_author,
        }
    }
}

/// Paper response model
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paper {
    pub id: Uuid,
    #[serde(rename = "paperID")]
    pub paper_id: String,
    #[serde(rename = "paperTitle")]
    pub title: String,
    #[serde(rename = "paperAbstract")]
    pub abstract_text: String,
    #[serde(rename = "paperKeywords")]
    pub keywords: Vec<String>,
    #[serde(rename = "paperAuthor")]
    pub authors: Vec<PaperAuthor>,
    #[serde(rename = "correspondingAuthor")]
    pub corresponding_authors: Vec<PaperAuthor>,
    #[serde(rename = "paperFile")]
    pub file_url: String,
    #[serde(rename = "paperSubmissionDate")]
    pub submitted_at: DateTime<Utc>,
    #[serde(rename = "paperStatus")]
    pub status: PaperStatus,
    pub conference: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl Paper {
    /// All authors, regular first, then corresponding
    pub fn all_authors(&self) -> impl Iterator<Item = &PaperAuthor> {
        self.authors.iter().chain(self.corresponding_authors.iter())
    }

    /// Whether `user_id` is linked to any author entry
    pub fn is_linked_to(&self, user_id: Uuid) -> bool {
        self.all_authors().any(|a| a.user_id == Some(user_id))
    }
}

/// A paper assembled by the submission workflow, ready to be inserted
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub paper_id: String,
    pub conference_id: Uuid,
    pub title: String,
    pub abstract_text: String,
    pub keywords: Vec<String>,
    pub authors: Vec<PaperAuthor>,
    pub corresponding_authors: Vec<PaperAuthor>,
    pub file_url: String,
    pub submitted_at: DateTime<Utc>,
}

/// Partial update of a paper; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PaperChanges {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub authors: Option<Vec<PaperAuthor>>,
    pub corresponding_authors: Option<Vec<PaperAuthor>>,
    pub file_url: Option<String>,
}

impl Paper {
    pub fn apply(&mut self, changes: PaperChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(abstract_text) = changes.abstract_text {
            self.abstract_text = abstract_text;
        }
        if let Some(keywords) = changes.keywords {
            self.keywords = keywords;
        }
        if let Some(authors) = changes.authors {
            self.authors = authors;
        }
        if let Some(corresponding) = changes.corresponding_authors {
            self.corresponding_authors = corresponding;
        }
        if let Some(file_url) = changes.file_url {
            self.file_url = file_url;
        }
        self.updated_at = Utc::now();
    }
}

/// Author entry with its account link expanded
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedAuthor {
    pub name: String,
    pub email: String,
    pub affiliation: String,
    pub country: String,
    pub is_corresponding_author: bool,
    pub user: Option<UserSummary>,
}

impl PopulatedAuthor {
    fn new(author: &PaperAuthor, users: &HashMap<Uuid, User>) -> Self {
        Self {
            name: author.name.clone(),
            email: author.email.clone(),
            affiliation: author.affiliation.clone(),
            country: author.country.clone(),
            is_corresponding_author: author.is_corresponding_author,
            user: author
                .user_id
                .and_then(|id| users.get(&id))
                .map(UserSummary::from),
        }
    }
}

/// Paper as returned to organizers, with author links populated
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PopulatedPaper {
    pub id: Uuid,
    #[serde(rename = "paperID")]
    pub paper_id: String,
    #[serde(rename = "paperTitle")]
    pub title: String,
    #[serde(rename = "paperAbstract")]
    pub abstract_text: String,
    #[serde(rename = "paperKeywords")]
    pub keywords: Vec<String>,
    #[serde(rename = "paperAuthor")]
    pub authors: Vec<PopulatedAuthor>,
    #[serde(rename = "correspondingAuthor")]
    pub corresponding_authors: Vec<PopulatedAuthor>,
    #[serde(rename = "paperFile")]
    pub file_url: String,
    #[serde(rename = "paperSubmissionDate")]
    pub submitted_at: DateTime<Utc>,
    #[serde(rename = "paperStatus")]
    pub status: PaperStatus,
    pub conference: Uuid,
}

impl PopulatedPaper {
    pub fn new(paper: Paper, users: &HashMap<Uuid, User>) -> Self {
        let populate = |list: &[PaperAuthor]| -> Vec<PopulatedAuthor> {
            list.iter().map(|a| PopulatedAuthor::new(a, users)).collect()
        };
        Self {
            id: paper.id,
            authors: populate(&paper.authors),
            corresponding_authors: populate(&paper.corresponding_authors),
            paper_id: paper.paper_id,
            title: paper.title,
            abstract_text: paper.abstract_text,
            keywords: paper.keywords,
            file_url: paper.file_url,
            submitted_at: paper.submitted_at,
            status: paper.status,
            conference: paper.conference,
        }
    }
}

/// Paper listed for one of its authors, with the conference acronym
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthoredPaper {
    #[serde(flatten)]
    pub paper: Paper,
    #[serde(rename = "conferenceAcronym")]
    pub conference_acronym: Option<String>,
}
