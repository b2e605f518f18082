use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::json_body;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::{
    AuthoredPapersResponse, ConferenceResponse, ConferencesResponse, CreateConference,
    ErrorResponse, UpdateConference,
};
use crate::services::{conferences, review};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/users/me/papers",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Papers where the caller is a linked author", body = AuthoredPapersResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn list_my_papers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<AuthoredPapersResponse>, AppError> {
    let papers = review::own_papers(state.store.as_ref(), &user).await?;
    Ok(Json(AuthoredPapersResponse {
        success: true,
        message: format!("{} submitted paper(s) found", papers.len()),
        papers,
    }))
}

#[utoipa::path(
    get,
    path = "/users/me/conferences",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Conferences organized by the caller", body = ConferencesResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn list_my_conferences(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ConferencesResponse>, AppError> {
    let conferences = state.store.list_conferences_by_organizer(user.id).await?;
    Ok(Json(ConferencesResponse {
        success: true,
        message: format!("{} organized conference(s) found", conferences.len()),
        conferences,
    }))
}

#[utoipa::path(
    post,
    path = "/users/me/conferences",
    tag = "users",
    request_body = CreateConference,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Conference created", body = ConferenceResponse),
        (status = 400, description = "Missing fields or title/acronym taken", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn create_conference(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateConference>, JsonRejection>,
) -> Result<(StatusCode, Json<ConferenceResponse>), AppError> {
    let form = json_body(payload)?;
    let conference =
        conferences::create_conference(state.store.as_ref(), &state.emails, &user, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ConferenceResponse {
            success: true,
            message: "Conference created successfully".into(),
            conference,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/users/me/conferences/{acronym}",
    tag = "users",
    params(("acronym" = String, Path, description = "Conference acronym")),
    request_body = UpdateConference,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Conference updated", body = ConferenceResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "No such conference organized by the caller", body = ErrorResponse)
    )
)]
pub async fn update_conference(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(acronym): Path<String>,
    payload: Result<Json<UpdateConference>, JsonRejection>,
) -> Result<Json<ConferenceResponse>, AppError> {
    let update = json_body(payload)?;
    let conference =
        conferences::update_conference(state.store.as_ref(), &user, &acronym, update).await?;
    Ok(Json(ConferenceResponse {
        success: true,
        message: "Conference updated successfully".into(),
        conference,
    }))
}
