use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::{AuthorDescriptor, ErrorResponse, PaperResponse, PaperUploadForm};
use crate::services::{PaperEdit, PaperFile, Submission};
use crate::state::AppState;
use crate::utils::split_keywords;

/// Raw multipart fields of a paper form
#[derive(Default)]
struct PaperForm {
    title: Option<String>,
    abstract_text: Option<String>,
    keywords: Option<String>,
    conference: Option<String>,
    authors: Option<String>,
    file: Option<PaperFile>,
}

fn form_error(e: impl std::fmt::Display) -> AppError {
    AppError::validation(format!("Invalid form data: {e}"))
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(form_error)
}

async fn read_form(mut multipart: Multipart) -> Result<PaperForm, AppError> {
    let mut form = PaperForm::default();
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "paperTitle" => form.title = Some(text(field).await?),
            "paperAbstract" => form.abstract_text = Some(text(field).await?),
            "paperKeywords" => form.keywords = Some(text(field).await?),
            "conference" => form.conference = Some(text(field).await?),
            "paperAuthors" => form.authors = Some(text(field).await?),
            "paperFile" => {
                let file_name = field.file_name().unwrap_or("paper").to_string();
                let bytes = field.bytes().await.map_err(form_error)?;
                form.file = Some(PaperFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }
    Ok(form)
}

fn parse_authors(raw: Option<&str>) -> Result<Vec<AuthorDescriptor>, AppError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            AppError::validation(format!("paperAuthors must be a JSON array of authors: {e}"))
        }),
        None => Ok(Vec::new()),
    }
}

#[utoipa::path(
    post,
    path = "/papers",
    tag = "papers",
    request_body(content = PaperUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Paper submitted", body = PaperResponse),
        (status = 400, description = "Missing file or authors, or conference closed", body = ErrorResponse),
        (status = 404, description = "Conference not found", body = ErrorResponse),
        (status = 500, description = "Upload or storage failure", body = ErrorResponse)
    )
)]
pub async fn submit_paper(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PaperResponse>), AppError> {
    let form = read_form(multipart).await?;
    let submission = Submission {
        title: form.title.unwrap_or_default(),
        abstract_text: form.abstract_text.unwrap_or_default(),
        keywords: form.keywords.as_deref().map(split_keywords).unwrap_or_default(),
        conference: form.conference.unwrap_or_default(),
        authors: parse_authors(form.authors.as_deref())?,
        file: form.file,
    };

    let paper = state.papers.submit(submission).await?;
    Ok((
        StatusCode::CREATED,
        Json(PaperResponse {
            success: true,
            message: "Paper submitted successfully".into(),
            paper,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/papers/{paperID}",
    tag = "papers",
    params(("paperID" = String, Path, description = "Paper ID, e.g. ABC-3")),
    request_body(content = PaperUploadForm, content_type = "multipart/form-data"),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Paper updated", body = PaperResponse),
        (status = 400, description = "No authors given", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Neither an author nor the organizer", body = ErrorResponse),
        (status = 404, description = "Paper not found", body = ErrorResponse)
    )
)]
pub async fn update_paper(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(paper_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<PaperResponse>, AppError> {
    let form = read_form(multipart).await?;
    let edit = PaperEdit {
        title: form.title,
        abstract_text: form.abstract_text,
        keywords: form.keywords.as_deref().map(split_keywords),
        authors: parse_authors(form.authors.as_deref())?,
        file: form.file,
    };

    let paper = state.papers.update(&user, &paper_id, edit).await?;
    Ok(Json(PaperResponse {
        success: true,
        message: "Paper updated successfully".into(),
        paper,
    }))
}
