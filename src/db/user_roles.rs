use uuid::Uuid;

/// Link a role to a user. System-assigned grants pass `assigned_by = None`.
/// `ON CONFLICT DO NOTHING` makes concurrent grants of the same pair safe.
pub async fn grant<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    role_id: Uuid,
    assigned_by: Option<Uuid>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id, assigned_by)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id, role_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(role_id)
    .bind(assigned_by)
    .execute(executor)
    .await?;
    Ok(())
}
