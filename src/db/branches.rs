use sqlx::PgPool;
use uuid::Uuid;

pub async fn active_ids_for_company(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM branches WHERE company_id = $1 AND is_active ORDER BY name",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

/// Branches assigned to the user, restricted to the resolved company.
pub async fn assigned_ids_for_user(
    pool: &PgPool,
    user_id: Uuid,
    company_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT b.id FROM branches b
         JOIN user_branch_assignments uba ON uba.branch_id = b.id
         WHERE uba.user_id = $1 AND b.company_id = $2 AND b.is_active
         ORDER BY b.name",
    )
    .bind(user_id)
    .bind(company_id)
    .fetch_all(pool)
    .await
}
