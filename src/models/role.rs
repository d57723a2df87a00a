use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named permission bundle. Priority orders display (highest first); the
/// system flag protects built-in roles from deletion elsewhere.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub priority: i32,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
}
