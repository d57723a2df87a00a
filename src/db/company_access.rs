use sqlx::PgPool;
use uuid::Uuid;

pub async fn has_active_access(
    pool: &PgPool,
    user_id: Uuid,
    company_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: Option<(bool,)> = sqlx::query_as(
        "SELECT TRUE FROM user_company_access
         WHERE user_id = $1 AND company_id = $2 AND is_active",
    )
    .bind(user_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Grant (or reactivate) access. Upsert keeps the grant idempotent under
/// concurrent super-admin bootstrap logins.
pub async fn grant(pool: &PgPool, user_id: Uuid, company_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_company_access (user_id, company_id, is_active)
         VALUES ($1, $2, TRUE)
         ON CONFLICT (user_id, company_id) DO UPDATE SET is_active = TRUE",
    )
    .bind(user_id)
    .bind(company_id)
    .execute(pool)
    .await?;
    Ok(())
}
