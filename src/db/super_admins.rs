use sqlx::PgPool;

use crate::models::SuperAdmin;

pub async fn find_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<SuperAdmin>, sqlx::Error> {
    sqlx::query_as::<_, SuperAdmin>("SELECT * FROM super_admins WHERE lower(email) = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}
