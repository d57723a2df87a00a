use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Break-glass account, kept in its own table and never mutated by this
/// service. Authentication against it materializes a mirror row in `users`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SuperAdmin {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}
