//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthoredPaper, Conference, Paper, PaperStatus, PopulatedPaper};
use crate::services::review::ExportRow;
use crate::utils::PaperRange;

/// Body of every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaperResponse {
    pub success: bool,
    pub message: String,
    pub paper: Paper,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthoredPapersResponse {
    pub success: bool,
    pub message: String,
    pub papers: Vec<AuthoredPaper>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConferenceResponse {
    pub success: bool,
    pub message: String,
    pub conference: Conference,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConferencesResponse {
    pub success: bool,
    pub message: String,
    pub conferences: Vec<Conference>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConferencePapersResponse {
    pub success: bool,
    pub message: String,
    pub conference: Conference,
    pub papers: Vec<PopulatedPaper>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletePapersResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExportResponse {
    pub success: bool,
    pub message: String,
    pub rows: Vec<ExportRow>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletePapersRequest {
    #[serde(default)]
    pub paper_id_list: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperStatusUpdate {
    pub paper_status: PaperStatus,
}

/// Empty `ranges` exports every paper
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExportRequest {
    #[serde(default)]
    pub ranges: Vec<PaperRange>,
}

/// Multipart fields of `POST /papers` and `PUT /papers/{paperID}`.
/// Only used to document the form.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct PaperUploadForm {
    pub paper_title: String,
    pub paper_abstract: Option<String>,
    /// Comma separated
    pub paper_keywords: Option<String>,
    /// Conference acronym; ignored on edit
    pub conference: Option<String>,
    /// JSON array of `AuthorDescriptor`
    pub paper_authors: String,
    #[schema(value_type = String, format = Binary)]
    pub paper_file: Option<Vec<u8>>,
}
