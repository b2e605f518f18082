//! Conference registry: creation and maintenance by organizers.

use askama::Template;

use crate::error::AppError;
use crate::mail::templates::{format_day, ConferenceCreatedEmail};
use crate::mail::EmailQueue;
use crate::models::{Conference, CreateConference, NewConference, UpdateConference, User, BOOK_CATEGORY};
use crate::store::Store;
use crate::utils::is_valid_acronym;

pub const MISSING_FIELDS: &str = "Missing required fields";

fn required(value: Option<String>) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(MISSING_FIELDS))
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Check a creation form and fill in the organizer
pub fn validate_new_conference(
    organizer: &User,
    form: CreateConference,
) -> Result<NewConference, AppError> {
    let missing = || AppError::validation(MISSING_FIELDS);

    let conference = NewConference {
        organizer_id: organizer.id,
        title: required(form.conference_title)?,
        acronym: required(form.conference_acronym)?,
        category: required(form.conference_category)?,
        first_day: form.conference_first_day.ok_or_else(missing)?,
        last_day: form.conference_last_day.ok_or_else(missing)?,
        submissions_deadline: form.conference_submissions_deadline_date.ok_or_else(missing)?,
        venue: optional(form.conference_venue),
        city: optional(form.conference_city),
        country: optional(form.conference_country),
        webpage: optional(form.conference_webpage),
        primary_area: required(form.conference_primary_area)?,
        secondary_area: optional(form.conference_secondary_area),
    };

    if !is_valid_acronym(&conference.acronym) {
        return Err(AppError::validation(
            "Conference acronym may only contain letters, digits, '-' and '_'",
        ));
    }
    if conference.last_day < conference.first_day {
        return Err(AppError::validation(
            "Conference last day must not be before its first day",
        ));
    }
    Ok(conference)
}

pub async fn create_conference(
    store: &dyn Store,
    emails: &EmailQueue,
    organizer: &User,
    form: CreateConference,
) -> Result<Conference, AppError> {
    let new = validate_new_conference(organizer, form)?;
    let conference = store.create_conference(new).await?;
    tracing::info!(acronym = %conference.acronym, organizer = %organizer.id, "Conference created");

    if conference.category != BOOK_CATEGORY {
        let first_day = format_day(&conference.first_day);
        let email = ConferenceCreatedEmail {
            organizer_name: &organizer.fullname,
            conference_title: &conference.title,
            first_day: &first_day,
        };
        match email.render() {
            Ok(html) => emails.enqueue(&organizer.email, email.subject(), html),
            Err(e) => tracing::warn!(error = %e, "Failed to render conference email"),
        }
    }
    Ok(conference)
}

/// Partial update of a conference organized by `organizer`
pub async fn update_conference(
    store: &dyn Store,
    organizer: &User,
    acronym: &str,
    update: UpdateConference,
) -> Result<Conference, AppError> {
    let mut update = update;
    if let Some(title) = update.conference_title.take() {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("Conference title must not be empty"));
        }
        update.conference_title = Some(title);
    }

    store
        .update_conference(acronym, organizer.id, update)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No conference {acronym} organized by you")))
}

pub async fn find_conference(store: &dyn Store, acronym: &str) -> Result<Conference, AppError> {
    store
        .find_conference_by_acronym(acronym)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Conference {acronym} not found")))
}

/// Conference `acronym`, provided `user` organizes it.
///
/// A conference organized by someone else is reported as forbidden, an
/// unknown acronym as not found.
pub async fn find_organized_conference(
    store: &dyn Store,
    user: &User,
    acronym: &str,
) -> Result<Conference, AppError> {
    let conference = find_conference(store, acronym).await?;
    if conference.organizer_id != user.id {
        return Err(AppError::Forbidden(format!(
            "You are not the organizer of {acronym}"
        )));
    }
    Ok(conference)
}
