use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub key: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}
