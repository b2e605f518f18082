#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

use paperdesk::mail::{EmailQueue, OutboxMailer};
use paperdesk::models::{Conference, NewConference, User};
use paperdesk::object_store::DiskStore;
use paperdesk::store::{MemoryStore, Store};
use paperdesk::{app, AppState};

pub const BASE_URL: &str = "http://localhost:3000";

/// A running test application backed by the in-memory store
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub outbox: Arc<OutboxMailer>,
    pub files: TempDir,
    pub staging: TempDir,
    pub organizer: User,
    pub organizer_token: String,
    pub conference: Conference,
}

impl TestApp {
    /// Register a verified user and open a session for them
    pub fn sign_up(&self, fullname: &str, email: &str) -> (User, String) {
        let user = self.store.add_user(fullname, email, true).unwrap();
        let token = self.store.add_session(user.id).unwrap();
        (user, token)
    }
}

/// Create the application router for testing
pub fn create_test_app(
    store: Arc<MemoryStore>,
    outbox: Arc<OutboxMailer>,
    files: &TempDir,
    staging: &TempDir,
) -> Router {
    let (emails, _worker) = EmailQueue::start(outbox, "conference@example.org");
    let objects = Arc::new(DiskStore::new(files.path(), BASE_URL));
    let state = AppState::new(
        store,
        objects,
        emails,
        staging.path().to_path_buf(),
        "http://localhost:3000/sign-up",
    )
    .with_files_dir(files.path());
    app(state)
}

pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let outbox = Arc::new(OutboxMailer::new());
    let files = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();

    let organizer = store
        .add_user("Olivia Organizer", "organizer@example.com", true)
        .unwrap();
    let organizer_token = store.add_session(organizer.id).unwrap();
    let day = NaiveDate::from_ymd_opt(2026, 11, 16).unwrap();
    let conference = store
        .create_conference(NewConference {
            organizer_id: organizer.id,
            title: "Applied Backend Conference".into(),
            acronym: "ABC".into(),
            category: "Conference".into(),
            first_day: day,
            last_day: day,
            submissions_deadline: day,
            venue: Some("Main Hall".into()),
            city: Some("Lisbon".into()),
            country: Some("Portugal".into()),
            webpage: None,
            primary_area: "Computer Science".into(),
            secondary_area: None,
        })
        .await
        .unwrap();

    let router = create_test_app(store.clone(), outbox.clone(), &files, &staging);
    TestApp {
        server: TestServer::new(router).unwrap(),
        store,
        outbox,
        files,
        staging,
        organizer,
        organizer_token,
        conference,
    }
}

pub fn author(name: &str, email: &str, corresponding: bool) -> serde_json::Value {
    json!({
        "name": name,
        "email": email,
        "country": "Portugal",
        "affiliation": "University of Lisbon",
        "isCorrespondingAuthor": corresponding,
    })
}

/// Multipart body of a paper submission
pub fn paper_form(title: &str, conference: &str, authors: &[serde_json::Value]) -> MultipartForm {
    MultipartForm::new()
        .add_text("paperTitle", title.to_string())
        .add_text("paperAbstract", "An abstract.")
        .add_text("paperKeywords", "ai, applications")
        .add_text("conference", conference.to_string())
        .add_text("paperAuthors", serde_json::to_string(authors).unwrap())
        .add_part(
            "paperFile",
            Part::bytes(b"%PDF-1.7 test".to_vec())
                .file_name("paper.pdf")
                .mime_type("application/pdf"),
        )
}
