use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

/// Emails are stored normalized (trimmed, lower-cased); callers must pass
/// them through `session::identity::normalize_email` first.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Materialize or refresh the mirror row for a super-admin. Keyed on the
/// normalized email so concurrent logins collapse onto one row; the conflict
/// arm refreshes the hash and names and forces the account active.
pub async fn upsert_super_admin_mirror<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash, first_name, last_name, is_active)
         VALUES ($1, $2, $3, $4, TRUE)
         ON CONFLICT (email) DO UPDATE SET
             password_hash = EXCLUDED.password_hash,
             first_name = EXCLUDED.first_name,
             last_name = EXCLUDED.last_name,
             is_active = TRUE
         RETURNING *",
    )
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .fetch_one(executor)
    .await
}

pub async fn record_login(
    pool: &PgPool,
    id: Uuid,
    company_id: Uuid,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login_at = $2, last_company_id = $3 WHERE id = $1")
        .bind(id)
        .bind(at)
        .bind(company_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_last_company(
    pool: &PgPool,
    id: Uuid,
    company_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_company_id = $2 WHERE id = $1")
        .bind(id)
        .bind(company_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}
