use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Conferences created through the organizer flow start in this state
pub const CONFERENCE_STATUS_SUBMITTED: &str = "submitted";

/// Category that does not trigger the conference-created email
pub const BOOK_CATEGORY: &str = "Book";

/// Conference response model (matches database schema)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Conference {
    pub id: Uuid,
    #[serde(rename = "conferenceOrganizer")]
    pub organizer_id: Uuid,
    #[serde(rename = "conferenceTitle")]
    pub title: String,
    #[serde(rename = "conferenceAcronym")]
    pub acronym: String,
    #[serde(rename = "conferenceCategory")]
    pub category: String,
    #[serde(rename = "conferenceFirstDay")]
    pub first_day: NaiveDate,
    #[serde(rename = "conferenceLastDay")]
    pub last_day: NaiveDate,
    #[serde(rename = "conferenceSubmissionsDeadlineDate")]
    pub submissions_deadline: NaiveDate,
    #[serde(rename = "conferenceVenue")]
    pub venue: Option<String>,
    #[serde(rename = "conferenceCity")]
    pub city: Option<String>,
    #[serde(rename = "conferenceCountry")]
    pub country: Option<String>,
    #[serde(rename = "conferenceWebpage")]
    pub webpage: Option<String>,
    #[serde(rename = "conferencePrimaryArea")]
    pub primary_area: String,
    #[serde(rename = "conferenceSecondaryArea")]
    pub secondary_area: Option<String>,
    #[serde(rename = "conferenceIsAcceptingPaper")]
    pub is_accepting_papers: bool,
    #[serde(rename = "conferenceStatus")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request model for creating a new conference.
///
/// Every field is optional on the wire so missing required fields surface as a
/// validation message instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConference {
    pub conference_category: Option<String>,
    pub conference_title: Option<String>,
    pub conference_acronym: Option<String>,
    pub conference_first_day: Option<NaiveDate>,
    pub conference_last_day: Option<NaiveDate>,
    pub conference_submissions_deadline_date: Option<NaiveDate>,
    pub conference_venue: Option<String>,
    pub conference_city: Option<String>,
    pub conference_country: Option<String>,
    pub conference_webpage: Option<String>,
    pub conference_primary_area: Option<String>,
    pub conference_secondary_area: Option<String>,
}

/// Request model for updating a conference owned by the caller
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConference {
    pub conference_title: Option<String>,
    pub conference_first_day: Option<NaiveDate>,
    pub conference_last_day: Option<NaiveDate>,
    pub conference_submissions_deadline_date: Option<NaiveDate>,
    pub conference_venue: Option<String>,
    pub conference_city: Option<String>,
    pub conference_country: Option<String>,
    pub conference_webpage: Option<String>,
    pub conference_primary_area: Option<String>,
    pub conference_secondary_area: Option<String>,
    pub conference_is_accepting_paper: Option<bool>,
}

/// A validated conference ready to be inserted
#[derive(Debug, Clone)]
pub struct NewConference {
    pub organizer_id: Uuid,
    pub title: String,
    pub acronym: String,
    pub category: String,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub submissions_deadline: NaiveDate,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub webpage: Option<String>,
    pub primary_area: String,
    pub secondary_area: Option<String>,
}

impl Conference {
    /// Apply a partial update, keeping existing values for absent fields
    pub fn apply(&mut self, update: UpdateConference) {
        if let Some(title) = update.conference_title {
            self.title = title;
        }
        if let Some(day) = update.conference_first_day {
            self.first_day = day;
        }
        if let Some(day) = update.conference_last_day {
            self.last_day = day;
        }
        if let Some(day) = update.conference_submissions_deadline_date {
            self.submissions_deadline = day;
        }
        if let Some(area) = update.conference_primary_area {
            self.primary_area = area;
        }
        if let Some(accepting) = update.conference_is_accepting_paper {
            self.is_accepting_papers = accepting;
        }
        self.venue = update.conference_venue.or(self.venue.take());
        self.city = update.conference_city.or(self.city.take());
        self.country = update.conference_country.or(self.country.take());
        self.webpage = update.conference_webpage.or(self.webpage.take());
        self.secondary_area = update.conference_secondary_area.or(self.secondary_area.take());
        self.updated_at = Utc::now();
    }
}
