use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Role;

pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Roles assigned to a user, highest priority first. Name breaks ties so the
/// ordering is deterministic.
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "SELECT r.* FROM roles r
         JOIN user_roles ur ON ur.role_id = r.id
         WHERE ur.user_id = $1
         ORDER BY r.priority DESC, r.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Distinct union of permission keys granted through the user's roles.
pub async fn permission_keys_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT p.key FROM permissions p
         JOIN role_permissions rp ON rp.permission_id = p.id
         JOIN user_roles ur ON ur.role_id = rp.role_id
         WHERE ur.user_id = $1
         ORDER BY p.key",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// The full permission catalog; super-admin sessions embed this instead of
/// role-derived grants.
pub async fn all_permission_keys(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT key FROM permissions ORDER BY key")
        .fetch_all(pool)
        .await
}
