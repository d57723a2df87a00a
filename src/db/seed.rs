use sqlx::PgPool;

/// Built-in role name every reconciled super-admin is granted.
pub const ADMINISTRATOR_ROLE: &str = "Administrator";

/// Built-in roles as (name, priority). All are system roles.
const DEFAULT_ROLES: &[(&str, i32)] = &[
    (ADMINISTRATOR_ROLE, 100),
    ("Management", 50),
    ("Employee", 10),
];

/// Permission catalog as (key, category).
const DEFAULT_PERMISSIONS: &[(&str, &str)] = &[
    ("dashboard.view", "dashboard"),
    ("registration.approve", "registration"),
    ("registration.reject", "registration"),
    ("employee.view", "employee"),
    ("employee.edit", "employee"),
    ("employee.deactivate", "employee"),
    ("shift.view_schedule", "shift"),
    ("shift.manage_schedule", "shift"),
    ("shift.end_shift", "shift"),
    ("shift.approve_authorizations", "shift"),
    ("pos.verify_transactions", "pos"),
    ("company.manage_settings", "company"),
    ("reports.view", "reports"),
];

/// Permission keys attached to each built-in role. Administrator carries the
/// whole catalog so ordinary users holding it are fully privileged without
/// the super-admin bypass.
const MANAGEMENT_PERMISSIONS: &[&str] = &[
    "dashboard.view",
    "employee.view",
    "shift.view_schedule",
    "shift.manage_schedule",
    "shift.end_shift",
    "shift.approve_authorizations",
    "pos.verify_transactions",
    "reports.view",
];

const EMPLOYEE_PERMISSIONS: &[&str] = &["dashboard.view", "shift.view_schedule"];

/// Idempotent seeding of built-in roles, the permission catalog and the
/// role-permission links. Runs once at process start inside a single
/// transaction; the advisory lock serializes concurrent instances booting
/// against the same database.
pub async fn ensure_defaults(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(7401)")
        .execute(&mut *tx)
        .await?;

    for (name, priority) in DEFAULT_ROLES {
        sqlx::query(
            "INSERT INTO roles (name, priority, is_system) VALUES ($1, $2, TRUE)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(priority)
        .execute(&mut *tx)
        .await?;
    }

    for (key, category) in DEFAULT_PERMISSIONS {
        sqlx::query(
            "INSERT INTO permissions (key, category) VALUES ($1, $2)
             ON CONFLICT (key) DO NOTHING",
        )
        .bind(key)
        .bind(category)
        .execute(&mut *tx)
        .await?;
    }

    link_all_permissions(&mut tx, ADMINISTRATOR_ROLE).await?;
    link_permissions(&mut tx, "Management", MANAGEMENT_PERMISSIONS).await?;
    link_permissions(&mut tx, "Employee", EMPLOYEE_PERMISSIONS).await?;

    tx.commit().await?;
    tracing::info!("Default roles and permissions ensured");
    Ok(())
}

async fn link_all_permissions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    role_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id)
         SELECT r.id, p.id FROM roles r, permissions p WHERE r.name = $1
         ON CONFLICT DO NOTHING",
    )
    .bind(role_name)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn link_permissions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    role_name: &str,
    keys: &[&str],
) -> Result<(), sqlx::Error> {
    let keys: Vec<String> = keys.iter().map(|k| (*k).to_string()).collect();
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id)
         SELECT r.id, p.id FROM roles r, permissions p
         WHERE r.name = $1 AND p.key = ANY($2)
         ON CONFLICT DO NOTHING",
    )
    .bind(role_name)
    .bind(keys)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
