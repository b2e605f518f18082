use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account owned by the external account system. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub affiliation: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Subset of a user exposed when author links are populated
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub affiliation: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname.clone(),
            email: user.email.clone(),
            affiliation: user.affiliation.clone(),
        }
    }
}
