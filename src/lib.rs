//! Paper submission service for academic conferences.
//!
//! Authors submit papers with a file and an author list; the service links
//! authors to verified accounts, numbers papers per conference, stores the
//! file in object storage and emails everyone involved. Organizers create
//! conferences, review submissions and export them.

pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod object_store;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use docs::ApiDoc;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let files_dir = state.files_dir.clone();
    let body_limit = state.max_upload_bytes;

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        // Papers
        .route("/papers", post(handlers::submit_paper))
        .route("/papers/{paper_id}", put(handlers::update_paper))
        // Signed-in user
        .route("/users/me/papers", get(handlers::list_my_papers))
        .route(
            "/users/me/conferences",
            get(handlers::list_my_conferences).post(handlers::create_conference),
        )
        .route("/users/me/conferences/{acronym}", put(handlers::update_conference))
        // Conferences
        .route("/conferences/{acronym}", get(handlers::get_conference))
        .route(
            "/conferences/{acronym}/papers",
            get(handlers::list_conference_papers).delete(handlers::delete_conference_papers),
        )
        .route(
            "/conferences/{acronym}/papers/{paper_id}/status",
            put(handlers::set_paper_status),
        )
        .route(
            "/conferences/{acronym}/papers/export",
            post(handlers::export_conference_papers),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(dir) = files_dir {
        router = router.nest_service("/files", ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
