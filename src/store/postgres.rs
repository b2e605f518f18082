use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    Conference, NewConference, NewPaper, Paper, PaperAuthor, PaperChanges, PaperStatus,
    UpdateConference, User, CONFERENCE_STATUS_SUBMITTED,
};

const USER_COLUMNS: &str = "u.id, u.fullname, u.email, u.affiliation, u.is_verified, u.created_at";

const CONFERENCE_COLUMNS: &str = r#"
    id, organizer_id, title, acronym, category,
    first_day, last_day, submissions_deadline,
    venue, city, country, webpage,
    primary_area, secondary_area,
    is_accepting_papers, status,
    created_at, updated_at
"#;

const PAPER_COLUMNS: &str = r#"
    id, paper_id, conference_id, title, abstract as abstract_text,
    COALESCE(keywords, ARRAY[]::text[]) as keywords,
    authors, corresponding_authors, file_url, status,
    submitted_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct PaperRow {
    id: Uuid,
    paper_id: String,
    conference_id: Uuid,
    title: String,
    abstract_text: String,
    keywords: Vec<String>,
    authors: Json<Vec<PaperAuthor>>,
    corresponding_authors: Json<Vec<PaperAuthor>>,
    file_url: String,
    status: String,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaperRow> for Paper {
    type Error = StoreError;

    fn try_from(row: PaperRow) -> Result<Self, Self::Error> {
        Ok(Paper {
            id: row.id,
            paper_id: row.paper_id,
            title: row.title,
            abstract_text: row.abstract_text,
            keywords: row.keywords,
            authors: row.authors.0,
            corresponding_authors: row.corresponding_authors.0,
            file_url: row.file_url,
            submitted_at: row.submitted_at,
            status: row.status.parse().map_err(StoreError::Backend)?,
            conference: row.conference_id,
            updated_at: row.updated_at,
        })
    }
}

fn into_papers(rows: Vec<PaperRow>) -> StoreResult<Vec<Paper>> {
    rows.into_iter().map(Paper::try_from).collect()
}

/// Unique violations surface as conflicts; everything else passes through
fn conflict_or(e: sqlx::Error, message: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Database(e),
    }
}

/// PostgreSQL backend. Author lists live in JSONB columns on the paper row.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Connect, optionally applying the embedded migrations
    pub async fn connect(url: &str, max_connections: u32, migrate: bool) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        if migrate {
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");
        }

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_verified_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1 AND u.is_verified"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_user_by_session(&self, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > NOW()
            "#
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_conference_by_acronym(&self, acronym: &str) -> StoreResult<Option<Conference>> {
        let conference = sqlx::query_as::<_, Conference>(&format!(
            "SELECT {CONFERENCE_COLUMNS} FROM conferences WHERE acronym = $1"
        ))
        .bind(acronym)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conference)
    }

    async fn find_conference_by_id(&self, id: Uuid) -> StoreResult<Option<Conference>> {
        let conference = sqlx::query_as::<_, Conference>(&format!(
            "SELECT {CONFERENCE_COLUMNS} FROM conferences WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conference)
    }

    async fn create_conference(&self, new: NewConference) -> StoreResult<Conference> {
        sqlx::query_as::<_, Conference>(&format!(
            r#"
            INSERT INTO conferences (
                organizer_id, title, acronym, category,
                first_day, last_day, submissions_deadline,
                venue, city, country, webpage,
                primary_area, secondary_area,
                is_accepting_papers, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE, $14)
            RETURNING {CONFERENCE_COLUMNS}
            "#
        ))
        .bind(new.organizer_id)
        .bind(&new.title)
        .bind(&new.acronym)
        .bind(&new.category)
        .bind(new.first_day)
        .bind(new.last_day)
        .bind(new.submissions_deadline)
        .bind(&new.venue)
        .bind(&new.city)
        .bind(&new.country)
        .bind(&new.webpage)
        .bind(&new.primary_area)
        .bind(&new.secondary_area)
        .bind(CONFERENCE_STATUS_SUBMITTED)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Conference already exists with this Title or Acronym"))
    }

    async fn update_conference(
        &self,
        acronym: &str,
        organizer_id: Uuid,
        update: UpdateConference,
    ) -> StoreResult<Option<Conference>> {
        sqlx::query_as::<_, Conference>(&format!(
            r#"
            UPDATE conferences SET
                title = COALESCE($1, title),
                first_day = COALESCE($2, first_day),
                last_day = COALESCE($3, last_day),
                submissions_deadline = COALESCE($4, submissions_deadline),
                venue = COALESCE($5, venue),
                city = COALESCE($6, city),
                country = COALESCE($7, country),
                webpage = COALESCE($8, webpage),
                primary_area = COALESCE($9, primary_area),
                secondary_area = COALESCE($10, secondary_area),
                is_accepting_papers = COALESCE($11, is_accepting_papers),
                updated_at = NOW()
            WHERE acronym = $12 AND organizer_id = $13
            RETURNING {CONFERENCE_COLUMNS}
            "#
        ))
        .bind(update.conference_title)
        .bind(update.conference_first_day)
        .bind(update.conference_last_day)
        .bind(update.conference_submissions_deadline_date)
        .bind(update.conference_venue)
        .bind(update.conference_city)
        .bind(update.conference_country)
        .bind(update.conference_webpage)
        .bind(update.conference_primary_area)
        .bind(update.conference_secondary_area)
        .bind(update.conference_is_accepting_paper)
        .bind(acronym)
        .bind(organizer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Conference already exists with this Title"))
    }

    async fn list_conferences_by_organizer(
        &self,
        organizer_id: Uuid,
    ) -> StoreResult<Vec<Conference>> {
        let conferences = sqlx::query_as::<_, Conference>(&format!(
            r#"
            SELECT {CONFERENCE_COLUMNS}
            FROM conferences
            WHERE organizer_id = $1
            ORDER BY first_day DESC, acronym
            "#
        ))
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conferences)
    }

    async fn next_paper_number(&self, conference_id: Uuid) -> StoreResult<i64> {
        // Single statement: the row lock taken by the upsert serializes
        // concurrent submissions to the same conference.
        let number = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO paper_counters (conference_id, last_number)
            VALUES ($1, 1)
            ON CONFLICT (conference_id)
            DO UPDATE SET last_number = paper_counters.last_number + 1
            RETURNING last_number
            "#,
        )
        .bind(conference_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(number)
    }

    async fn insert_paper(&self, new: NewPaper) -> StoreResult<Paper> {
        let row = sqlx::query_as::<_, PaperRow>(&format!(
            r#"
            INSERT INTO papers (
                paper_id, conference_id, title, abstract, keywords,
                authors, corresponding_authors, file_url, status,
                submitted_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {PAPER_COLUMNS}
            "#
        ))
        .bind(&new.paper_id)
        .bind(new.conference_id)
        .bind(&new.title)
        .bind(&new.abstract_text)
        .bind(&new.keywords)
        .bind(Json(&new.authors))
        .bind(Json(&new.corresponding_authors))
        .bind(&new.file_url)
        .bind(PaperStatus::Submitted.as_str())
        .bind(new.submitted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, &format!("Paper {} already exists", new.paper_id)))?;

        row.try_into()
    }

    async fn find_paper(&self, paper_id: &str) -> StoreResult<Option<Paper>> {
        sqlx::query_as::<_, PaperRow>(&format!(
            "SELECT {PAPER_COLUMNS} FROM papers WHERE paper_id = $1"
        ))
        .bind(paper_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Paper::try_from)
        .transpose()
    }

    async fn update_paper(
        &self,
        paper_id: &str,
        changes: PaperChanges,
    ) -> StoreResult<Option<Paper>> {
        sqlx::query_as::<_, PaperRow>(&format!(
            r#"
            UPDATE papers SET
                title = COALESCE($1, title),
                abstract = COALESCE($2, abstract),
                keywords = COALESCE($3, keywords),
                authors = COALESCE($4, authors),
                corresponding_authors = COALESCE($5, corresponding_authors),
                file_url = COALESCE($6, file_url),
                updated_at = NOW()
            WHERE paper_id = $7
            RETURNING {PAPER_COLUMNS}
            "#
        ))
        .bind(changes.title)
        .bind(changes.abstract_text)
        .bind(changes.keywords)
        .bind(changes.authors.map(Json))
        .bind(changes.corresponding_authors.map(Json))
        .bind(changes.file_url)
        .bind(paper_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Paper::try_from)
        .transpose()
    }

    async fn set_paper_status(
        &self,
        conference_id: Uuid,
        paper_id: &str,
        status: PaperStatus,
    ) -> StoreResult<Option<Paper>> {
        sqlx::query_as::<_, PaperRow>(&format!(
            r#"
            UPDATE papers SET status = $1, updated_at = NOW()
            WHERE conference_id = $2 AND paper_id = $3
            RETURNING {PAPER_COLUMNS}
            "#
        ))
        .bind(status.as_str())
        .bind(conference_id)
        .bind(paper_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Paper::try_from)
        .transpose()
    }

    async fn list_papers_by_conference(&self, conference_id: Uuid) -> StoreResult<Vec<Paper>> {
        let rows = sqlx::query_as::<_, PaperRow>(&format!(
            r#"
            SELECT {PAPER_COLUMNS}
            FROM papers
            WHERE conference_id = $1
            ORDER BY submitted_at, paper_id
            "#
        ))
        .bind(conference_id)
        .fetch_all(&self.pool)
        .await?;

        into_papers(rows)
    }

    async fn list_papers_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Paper>> {
        let link = json!([{ "userId": user_id }]);
        let rows = sqlx::query_as::<_, PaperRow>(&format!(
            r#"
            SELECT {PAPER_COLUMNS}
            FROM papers
            WHERE authors @> $1 OR corresponding_authors @> $1
            ORDER BY submitted_at DESC
            "#
        ))
        .bind(Json(link))
        .fetch_all(&self.pool)
        .await?;

        into_papers(rows)
    }

    async fn delete_papers(&self, conference_id: Uuid, paper_ids: &[String]) -> StoreResult<u64> {
        let result =
            sqlx::query("DELETE FROM papers WHERE conference_id = $1 AND paper_id = ANY($2)")
                .bind(conference_id)
                .bind(paper_ids)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
