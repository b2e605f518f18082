use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::json_body;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::{
    ConferencePapersResponse, ConferenceResponse, DeletePapersRequest, DeletePapersResponse,
    ErrorResponse, ExportRequest, ExportResponse, PaperResponse, PaperStatusUpdate,
};
use crate::services::{conferences, review};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/conferences/{acronym}",
    tag = "conferences",
    params(("acronym" = String, Path, description = "Conference acronym, e.g. ABC")),
    responses(
        (status = 200, description = "Conference found", body = ConferenceResponse),
        (status = 404, description = "Conference not found", body = ErrorResponse)
    )
)]
pub async fn get_conference(
    State(state): State<AppState>,
    Path(acronym): Path<String>,
) -> Result<Json<ConferenceResponse>, AppError> {
    let conference = conferences::find_conference(state.store.as_ref(), &acronym).await?;
    Ok(Json(ConferenceResponse {
        success: true,
        message: "Conference found".into(),
        conference,
    }))
}

#[utoipa::path(
    get,
    path = "/conferences/{acronym}/papers",
    tag = "conferences",
    params(("acronym" = String, Path, description = "Conference acronym")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Papers with author accounts populated", body = ConferencePapersResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Caller does not organize the conference", body = ErrorResponse),
        (status = 404, description = "Conference not found", body = ErrorResponse)
    )
)]
pub async fn list_conference_papers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(acronym): Path<String>,
) -> Result<Json<ConferencePapersResponse>, AppError> {
    let (conference, papers) =
        review::conference_papers(state.store.as_ref(), &user, &acronym).await?;
    let message = if papers.is_empty() {
        "No papers found for this conference"
    } else {
        "Papers found for the conference"
    };
    Ok(Json(ConferencePapersResponse {
        success: true,
        message: message.into(),
        conference,
        papers,
    }))
}

#[utoipa::path(
    delete,
    path = "/conferences/{acronym}/papers",
    tag = "conferences",
    params(("acronym" = String, Path, description = "Conference acronym")),
    request_body = DeletePapersRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Papers deleted", body = DeletePapersResponse),
        (status = 400, description = "Empty paper list", body = ErrorResponse),
        (status = 403, description = "Caller does not organize the conference", body = ErrorResponse)
    )
)]
pub async fn delete_conference_papers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(acronym): Path<String>,
    payload: Result<Json<DeletePapersRequest>, JsonRejection>,
) -> Result<Json<DeletePapersResponse>, AppError> {
    let request = json_body(payload)?;
    let deleted_count =
        review::delete_papers(state.store.as_ref(), &user, &acronym, &request.paper_id_list)
            .await?;
    Ok(Json(DeletePapersResponse {
        success: true,
        message: format!("{deleted_count} paper(s) deleted successfully"),
        deleted_count,
    }))
}

#[utoipa::path(
    put,
    path = "/conferences/{acronym}/papers/{paperID}/status",
    tag = "conferences",
    params(
        ("acronym" = String, Path, description = "Conference acronym"),
        ("paperID" = String, Path, description = "Paper ID")
    ),
    request_body = PaperStatusUpdate,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Status changed", body = PaperResponse),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 403, description = "Caller does not organize the conference", body = ErrorResponse),
        (status = 404, description = "Paper not found", body = ErrorResponse)
    )
)]
pub async fn set_paper_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((acronym, paper_id)): Path<(String, String)>,
    payload: Result<Json<PaperStatusUpdate>, JsonRejection>,
) -> Result<Json<PaperResponse>, AppError> {
    let update = json_body(payload)?;
    let paper = review::set_status(
        state.store.as_ref(),
        &user,
        &acronym,
        &paper_id,
        update.paper_status,
    )
    .await?;
    Ok(Json(PaperResponse {
        success: true,
        message: format!("Paper {} is now {}", paper.paper_id, paper.status),
        paper,
    }))
}

#[utoipa::path(
    post,
    path = "/conferences/{acronym}/papers/export",
    tag = "conferences",
    params(("acronym" = String, Path, description = "Conference acronym")),
    request_body = ExportRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Spreadsheet rows", body = ExportResponse),
        (status = 400, description = "Invalid range", body = ErrorResponse),
        (status = 403, description = "Caller does not organize the conference", body = ErrorResponse)
    )
)]
pub async fn export_conference_papers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(acronym): Path<String>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Json<ExportResponse>, AppError> {
    let request = json_body(payload)?;
    let rows =
        review::export_papers(state.store.as_ref(), &user, &acronym, &request.ranges).await?;
    Ok(Json(ExportResponse {
        success: true,
        message: format!("{} paper(s) exported", rows.len()),
        rows,
    }))
}
