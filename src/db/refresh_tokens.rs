use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::RefreshToken;

pub async fn issue(
    pool: &PgPool,
    user_id: Uuid,
    company_id: Uuid,
    company_db_name: &str,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<RefreshToken, sqlx::Error> {
    sqlx::query_as::<_, RefreshToken>(
        "INSERT INTO refresh_tokens (user_id, company_id, company_db_name, token_hash, expires_at)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(user_id)
    .bind(company_id)
    .bind(company_db_name)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// Consume a refresh credential. The conditional UPDATE both validates and
/// revokes in one statement, so two concurrent redeems of the same hash get
/// exactly one row back; the loser sees `None`. Expired and already-revoked
/// rows never match.
pub async fn redeem(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<RefreshToken>, sqlx::Error> {
    sqlx::query_as::<_, RefreshToken>(
        "UPDATE refresh_tokens SET is_revoked = TRUE
         WHERE token_hash = $1 AND NOT is_revoked AND expires_at > now()
         RETURNING *",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

/// Revoke by hash. Unknown or already-revoked hashes are a no-op; logout
/// relies on that.
pub async fn revoke(pool: &PgPool, token_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE refresh_tokens SET is_revoked = TRUE WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Revoke every active credential for a user except the one identified by
/// `except_hash` (the session that initiated a password change).
pub async fn revoke_all_except(
    pool: &PgPool,
    user_id: Uuid,
    except_hash: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET is_revoked = TRUE
         WHERE user_id = $1 AND NOT is_revoked AND ($2::TEXT IS NULL OR token_hash <> $2)",
    )
    .bind(user_id)
    .bind(except_hash)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
