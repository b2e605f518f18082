mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{author, paper_form, spawn_app};
use paperdesk::store::Store;

// ============================================================================
// Health & docs
// ============================================================================

#[tokio::test]
async fn test_health_with_oneshot() {
    let store = std::sync::Arc::new(paperdesk::store::MemoryStore::new());
    let outbox = std::sync::Arc::new(paperdesk::mail::OutboxMailer::new());
    let files = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();
    let app = common::create_test_app(store, outbox, &files, &staging);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let response = app.server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["paths"]["/papers"].is_object());
}

// ============================================================================
// Paper submission
// ============================================================================

#[tokio::test]
async fn test_submit_paper_end_to_end() {
    let app = spawn_app().await;
    let (alice, _) = app.sign_up("Alice Author", "alice@example.com");

    let response = app
        .server
        .post("/papers")
        .multipart(paper_form(
            "A Study on AI Applications",
            "ABC",
            &[
                author("Bob Coauthor", "bob@example.com", false),
                author("Alice Author", "alice@example.com", true),
            ],
        ))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let paper = &body["paper"];
    assert_eq!(paper["paperID"], "ABC-1");
    assert_eq!(paper["paperTitle"], "A Study on AI Applications");
    assert_eq!(paper["paperStatus"], "submitted");
    assert_eq!(paper["paperKeywords"], json!(["ai", "applications"]));
    assert_eq!(paper["paperAuthor"][0]["email"], "bob@example.com");
    assert!(paper["paperAuthor"][0].get("userId").is_none());
    assert_eq!(
        paper["correspondingAuthor"][0]["userId"],
        json!(alice.id.to_string())
    );
    assert_eq!(paper["paperFile"], "http://localhost:3000/files/ABC/_1_paper.pdf");

    // The stored file is served back
    let file = app.server.get("/files/ABC/_1_paper.pdf").await;
    file.assert_status_ok();
    assert_eq!(&file.as_bytes()[..], b"%PDF-1.7 test");

    // Bob is invited, both authors get a confirmation
    let sent = app.outbox.wait_for(3, Duration::from_secs(2)).await;
    let confirmations: Vec<&str> = sent
        .iter()
        .filter(|e| e.subject == "Paper Submission ABC ABC-1")
        .map(|e| e.to.as_str())
        .collect();
    assert_eq!(confirmations, ["bob@example.com", "alice@example.com"]);
    assert!(sent
        .iter()
        .any(|e| e.to == "bob@example.com" && e.subject.contains("added as an author")));
}

#[tokio::test]
async fn test_paper_ids_increase_per_conference() {
    let app = spawn_app().await;
    for expected in ["ABC-1", "ABC-2", "ABC-3"] {
        let response = app
            .server
            .post("/papers")
            .multipart(paper_form("Paper", "ABC", &[author("A", "a@example.com", true)]))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["paper"]["paperID"], expected);
    }
}

#[tokio::test]
async fn test_submit_without_authors_is_rejected() {
    let app = spawn_app().await;
    let response = app
        .server
        .post("/papers")
        .multipart(paper_form("No Authors", "ABC", &[]))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please add at least yourself as Author");
    assert!(app
        .store
        .list_papers_by_conference(app.conference.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_submit_to_unknown_conference() {
    let app = spawn_app().await;
    let response = app
        .server
        .post("/papers")
        .multipart(paper_form("Lost", "NOPE", &[author("A", "a@example.com", true)]))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    // No number was consumed
    assert_eq!(app.store.next_paper_number(app.conference.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_submit_with_malformed_authors() {
    let app = spawn_app().await;
    let form = axum_test::multipart::MultipartForm::new()
        .add_text("paperTitle", "Broken")
        .add_text("conference", "ABC")
        .add_text("paperAuthors", "not json")
        .add_part(
            "paperFile",
            axum_test::multipart::Part::bytes(b"%PDF".to_vec()).file_name("p.pdf"),
        );
    let response = app.server.post("/papers").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Paper editing
// ============================================================================

#[tokio::test]
async fn test_update_paper_requires_authentication() {
    let app = spawn_app().await;
    let response = app
        .server
        .put("/papers/ABC-1")
        .multipart(paper_form("Edit", "ABC", &[author("A", "a@example.com", true)]))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .put("/papers/ABC-1")
        .authorization_bearer("x".repeat(40))
        .multipart(paper_form("Edit", "ABC", &[author("A", "a@example.com", true)]))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_paper_by_author_and_stranger() {
    let app = spawn_app().await;
    let (_, alice_token) = app.sign_up("Alice Author", "alice@example.com");
    let (_, mallory_token) = app.sign_up("Mallory", "mallory@example.com");

    app.server
        .post("/papers")
        .multipart(paper_form(
            "First Draft",
            "ABC",
            &[author("Alice Author", "alice@example.com", true)],
        ))
        .await
        .assert_status(StatusCode::CREATED);

    let edit = || {
        axum_test::multipart::MultipartForm::new()
            .add_text("paperTitle", "Final Version")
            .add_text(
                "paperAuthors",
                serde_json::to_string(&[author("Alice Author", "alice@example.com", true)])
                    .unwrap(),
            )
    };

    let response = app
        .server
        .put("/papers/ABC-1")
        .authorization_bearer(&mallory_token)
        .multipart(edit())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .put("/papers/ABC-1")
        .authorization_bearer(&alice_token)
        .multipart(edit())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["paper"]["paperTitle"], "Final Version");
    assert_eq!(body["paper"]["paperAbstract"], "An abstract.");

    // The organizer may edit too
    let response = app
        .server
        .put("/papers/ABC-1")
        .authorization_bearer(&app.organizer_token)
        .multipart(edit())
        .await;
    response.assert_status_ok();

    let response = app
        .server
        .put("/papers/ABC-404")
        .authorization_bearer(&alice_token)
        .multipart(edit())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_my_papers_lists_linked_papers() {
    let app = spawn_app().await;
    let (_, alice_token) = app.sign_up("Alice Author", "alice@example.com");
    app.server
        .post("/papers")
        .multipart(paper_form(
            "Mine",
            "ABC",
            &[author("Alice Author", "alice@example.com", false)],
        ))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .get("/users/me/papers")
        .authorization_bearer(&alice_token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["papers"][0]["paperID"], "ABC-1");
    assert_eq!(body["papers"][0]["conferenceAcronym"], "ABC");

    let response = app
        .server
        .get("/users/me/papers")
        .authorization_bearer(&app.organizer_token)
        .await;
    let body: Value = response.json();
    assert_eq!(body["papers"], json!([]));
}

// ============================================================================
// Conferences
// ============================================================================

fn conference_body(acronym: &str, category: &str) -> Value {
    json!({
        "conferenceCategory": category,
        "conferenceTitle": format!("{acronym} Workshop"),
        "conferenceAcronym": acronym,
        "conferenceFirstDay": "2026-12-01",
        "conferenceLastDay": "2026-12-03",
        "conferenceSubmissionsDeadlineDate": "2026-10-31",
        "conferencePrimaryArea": "Computer Science",
        "conferenceCity": "Porto",
    })
}

#[tokio::test]
async fn test_conference_lifecycle() {
    let app = spawn_app().await;
    let (_, token) = app.sign_up("New Organizer", "new@example.com");

    let response = app
        .server
        .post("/users/me/conferences")
        .authorization_bearer(&token)
        .json(&conference_body("XYZ", "Conference"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["conference"]["conferenceAcronym"], "XYZ");
    assert_eq!(body["conference"]["conferenceIsAcceptingPaper"], true);
    assert_eq!(body["conference"]["conferenceStatus"], "submitted");

    let sent = app.outbox.wait_for(1, Duration::from_secs(2)).await;
    assert_eq!(sent[0].to, "new@example.com");

    // Duplicate acronym
    let mut duplicate = conference_body("XYZ", "Conference");
    duplicate["conferenceTitle"] = json!("Another Title");
    let response = app
        .server
        .post("/users/me/conferences")
        .authorization_bearer(&token)
        .json(&duplicate)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Missing fields
    let response = app
        .server
        .post("/users/me/conferences")
        .authorization_bearer(&token)
        .json(&json!({ "conferenceTitle": "Only a title" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Missing required fields");

    let response = app
        .server
        .get("/users/me/conferences")
        .authorization_bearer(&token)
        .await;
    let body: Value = response.json();
    assert_eq!(body["conferences"].as_array().unwrap().len(), 1);

    // Close submissions, then a submission is refused
    let response = app
        .server
        .put("/users/me/conferences/XYZ")
        .authorization_bearer(&token)
        .json(&json!({ "conferenceIsAcceptingPaper": false }))
        .await;
    response.assert_status_ok();

    let response = app
        .server
        .put("/users/me/conferences/XYZ")
        .authorization_bearer(&app.organizer_token)
        .json(&json!({ "conferenceCity": "Braga" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .post("/papers")
        .multipart(paper_form("Late", "XYZ", &[author("A", "a@example.com", true)]))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app.server.get("/conferences/XYZ").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["conference"]["conferenceCity"], "Porto");
    assert_eq!(body["conference"]["conferenceIsAcceptingPaper"], false);

    app.server
        .get("/conferences/NONE")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Organizer review
// ============================================================================

async fn submit_papers(app: &common::TestApp, count: usize) {
    for i in 0..count {
        app.server
            .post("/papers")
            .multipart(paper_form(
                &format!("Paper {i}"),
                "ABC",
                &[author("Alice Author", "alice@example.com", true)],
            ))
            .await
            .assert_status(StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_conference_papers_are_organizer_only() {
    let app = spawn_app().await;
    let (_, alice_token) = app.sign_up("Alice Author", "alice@example.com");
    submit_papers(&app, 2).await;

    app.server
        .get("/conferences/ABC/papers")
        .authorization_bearer(&alice_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .get("/conferences/ABC/papers")
        .authorization_bearer(&app.organizer_token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["conference"]["conferenceAcronym"], "ABC");
    assert_eq!(body["papers"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["papers"][0]["correspondingAuthor"][0]["user"]["fullname"],
        "Alice Author"
    );
}

#[tokio::test]
async fn test_status_change_and_bulk_delete() {
    let app = spawn_app().await;
    submit_papers(&app, 3).await;

    let response = app
        .server
        .put("/conferences/ABC/papers/ABC-2/status")
        .authorization_bearer(&app.organizer_token)
        .json(&json!({ "paperStatus": "accepted" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["paper"]["paperStatus"], "accepted");

    app.server
        .put("/conferences/ABC/papers/ABC-2/status")
        .authorization_bearer(&app.organizer_token)
        .json(&json!({ "paperStatus": "maybe" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .delete("/conferences/ABC/papers")
        .authorization_bearer(&app.organizer_token)
        .json(&json!({ "paperIdList": [] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .delete("/conferences/ABC/papers")
        .authorization_bearer(&app.organizer_token)
        .json(&json!({ "paperIdList": ["ABC-1", "ABC-3"] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["deletedCount"], 2);
    assert_eq!(body["message"], "2 paper(s) deleted successfully");

    let remaining = app
        .store
        .list_papers_by_conference(app.conference.id)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].paper_id, "ABC-2");
}

#[tokio::test]
async fn test_export_with_ranges() {
    let app = spawn_app().await;
    submit_papers(&app, 6).await;

    let response = app
        .server
        .post("/conferences/ABC/papers/export")
        .authorization_bearer(&app.organizer_token)
        .json(&json!({ "ranges": [
            { "lowerRange": 1, "upperRange": 2 },
            { "lowerRange": 5, "upperRange": 9 }
        ] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<&str> = body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["PaperID"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["ABC-1", "ABC-2", "ABC-5", "ABC-6"]);
    assert_eq!(body["rows"][0]["Keywords"], "ai, applications");
    assert_eq!(body["rows"][0]["EmailID"], "alice@example.com");

    let response = app
        .server
        .post("/conferences/ABC/papers/export")
        .authorization_bearer(&app.organizer_token)
        .json(&json!({}))
        .await;
    let body: Value = response.json();
    assert_eq!(body["rows"].as_array().unwrap().len(), 6);

    app.server
        .post("/conferences/ABC/papers/export")
        .authorization_bearer(&app.organizer_token)
        .json(&json!({ "ranges": [{ "lowerRange": 4, "upperRange": 4 }] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
