//! HTML email templates, rendered with askama from `templates/`.

use askama::Template;
use chrono::{DateTime, NaiveDate, Utc};

/// Sent to every author once a paper is stored
#[derive(Template)]
#[template(path = "paper_submission.html")]
pub struct PaperSubmissionEmail<'a> {
    pub username: &'a str,
    pub paper_id: &'a str,
    pub paper_title: &'a str,
    pub conference_name: &'a str,
    pub submission_date: &'a str,
    pub submission_time: &'a str,
}

impl PaperSubmissionEmail<'_> {
    pub fn subject(&self) -> String {
        format!("Paper Submission {} {}", self.conference_name, self.paper_id)
    }
}

/// Sent to authors whose email has no verified account
#[derive(Template)]
#[template(path = "author_invitation.html")]
pub struct AuthorInvitationEmail<'a> {
    pub email: &'a str,
    pub paper_title: &'a str,
    pub is_corresponding: bool,
    pub register_url: &'a str,
}

impl AuthorInvitationEmail<'_> {
    pub fn subject(&self) -> String {
        format!("You have been added as an author on \"{}\"", self.paper_title)
    }
}

/// Sent to the organizer after a conference is created
#[derive(Template)]
#[template(path = "conference_created.html")]
pub struct ConferenceCreatedEmail<'a> {
    pub organizer_name: &'a str,
    pub conference_title: &'a str,
    pub first_day: &'a str,
}

impl ConferenceCreatedEmail<'_> {
    pub fn subject(&self) -> String {
        format!("Conference \"{}\" created", self.conference_title)
    }
}

/// `28 Aug 2025`
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%d %b %Y").to_string()
}

/// `03:45 PM`
pub fn format_time(at: &DateTime<Utc>) -> String {
    at.format("%I:%M %p").to_string()
}

/// `Monday, 4 May 2026`
pub fn format_day(day: &NaiveDate) -> String {
    day.format("%A, %-d %B %Y").to_string()
}
