use sqlx::PgPool;
use uuid::Uuid;

/// Best-effort audit trail. Session operations must not fail because the
/// audit insert did, so errors are logged and swallowed here.
pub async fn record(
    pool: &PgPool,
    company_id: Option<Uuid>,
    user_id: Option<Uuid>,
    action: &str,
    resource_type: &str,
    resource_id: Option<Uuid>,
    details: Option<serde_json::Value>,
) {
    if let Err(e) = insert(pool, company_id, user_id, action, resource_type, resource_id, details).await
    {
        tracing::error!("Failed to record audit event {action}: {e}");
    }
}

async fn insert(
    pool: &PgPool,
    company_id: Option<Uuid>,
    user_id: Option<Uuid>,
    action: &str,
    resource_type: &str,
    resource_id: Option<Uuid>,
    details: Option<serde_json::Value>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_events (company_id, user_id, action, resource_type, resource_id, details)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(company_id)
    .bind(user_id)
    .bind(action)
    .bind(resource_type)
    .bind(resource_id)
    .bind(details)
    .execute(pool)
    .await?;
    Ok(())
}
