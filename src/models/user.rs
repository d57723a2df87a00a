use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub employee_number: Option<String>,
    pub employment_status: String,
    pub is_active: bool,
    pub is_profile_complete: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
