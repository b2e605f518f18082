use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models::{
    AuthorDescriptor, AuthoredPaper, AuthoredPapersResponse, Conference, ConferencePapersResponse,
    ConferenceResponse, ConferencesResponse, CreateConference, DeletePapersRequest,
    DeletePapersResponse, ErrorResponse, ExportRequest, ExportResponse, Paper, PaperAuthor,
    PaperResponse, PaperStatus, PaperStatusUpdate, PaperUploadForm, PopulatedAuthor,
    PopulatedPaper, UpdateConference, UserSummary,
};
use crate::services::review::ExportRow;
use crate::utils::PaperRange;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "PaperDesk API", description = "Conference paper submission and review"),
    paths(
        handlers::health,
        handlers::submit_paper,
        handlers::update_paper,
        handlers::list_my_papers,
        handlers::list_my_conferences,
        handlers::create_conference,
        handlers::update_conference,
        handlers::get_conference,
        handlers::list_conference_papers,
        handlers::delete_conference_papers,
        handlers::set_paper_status,
        handlers::export_conference_papers,
    ),
    components(schemas(
        AuthorDescriptor,
        AuthoredPaper,
        AuthoredPapersResponse,
        Conference,
        ConferencePapersResponse,
        ConferenceResponse,
        ConferencesResponse,
        CreateConference,
        DeletePapersRequest,
        DeletePapersResponse,
        ErrorResponse,
        ExportRequest,
        ExportResponse,
        ExportRow,
        Paper,
        PaperAuthor,
        PaperRange,
        PaperResponse,
        PaperStatus,
        PaperStatusUpdate,
        PaperUploadForm,
        PopulatedAuthor,
        PopulatedPaper,
        UpdateConference,
        UserSummary,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "papers", description = "Paper submission and editing"),
        (name = "users", description = "The signed-in user's papers and conferences"),
        (name = "conferences", description = "Conference lookup and organizer review"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
