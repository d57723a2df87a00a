use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Company;

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_active_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE slug = $1 AND is_active")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn list_active(pool: &PgPool) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT * FROM companies WHERE is_active ORDER BY name, created_at",
    )
    .fetch_all(pool)
    .await
}

/// Active companies the user can see through active access grants, in the
/// same order as `list_active`.
pub async fn list_accessible(pool: &PgPool, user_id: Uuid) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT c.* FROM companies c
         JOIN user_company_access uca ON uca.company_id = c.id
         WHERE uca.user_id = $1 AND uca.is_active AND c.is_active
         ORDER BY c.name, c.created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
