use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password;
use crate::db;
use crate::db::seed::ADMINISTRATOR_ROLE;
use crate::error::AppError;
use crate::models::User;

/// The authenticated identity a session operation acts on behalf of.
/// Resolved exactly once per operation; later stages branch on the variant
/// instead of re-checking the super-admin table.
#[derive(Debug, Clone)]
pub enum Principal {
    OrdinaryUser(User),
    ReconciledSuperAdmin(User),
}

impl Principal {
    pub fn user(&self) -> &User {
        match self {
            Principal::OrdinaryUser(u) | Principal::ReconciledSuperAdmin(u) => u,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            Principal::OrdinaryUser(u) | Principal::ReconciledSuperAdmin(u) => u,
        }
    }

    pub fn id(&self) -> Uuid {
        self.user().id
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Principal::ReconciledSuperAdmin(_))
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Split a super-admin display name into (first, last) for the mirror row.
/// First token becomes the first name, the remainder the last name, with
/// "Super" / "Admin" filling whichever side is missing.
pub fn split_display_name(name: &str) -> (String, String) {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or("Super").to_string();
    let rest: Vec<&str> = tokens.collect();
    let last = if rest.is_empty() {
        "Admin".to_string()
    } else {
        rest.join(" ")
    };
    (first, last)
}

/// Authenticate a login attempt against both identity sources and produce
/// exactly one principal.
///
/// Order matters: the ordinary user row wins when its hash verifies; only
/// then is the break-glass table consulted as a fallback, which mirrors the
/// super-admin into `users` so every later stage deals with one identity
/// model. Unknown email and wrong password collapse into the same error.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    submitted_password: &str,
) -> Result<Principal, AppError> {
    let email = normalize_email(email);

    if let Some(user) = db::users::find_by_email(pool, &email).await? {
        let verified = password::verify(submitted_password, &user.password_hash)
            .map_err(AppError::Internal)?;
        if verified {
            let principal = if db::super_admins::find_by_email(pool, &email).await?.is_some() {
                ensure_administrator_role(pool, user.id).await?;
                Principal::ReconciledSuperAdmin(user)
            } else {
                Principal::OrdinaryUser(user)
            };
            return require_active(principal);
        }
        // Fall through: the mirror's copied hash may be stale after a
        // super-admin password rotation.
    }

    let Some(super_admin) = db::super_admins::find_by_email(pool, &email).await? else {
        return Err(AppError::InvalidCredentials);
    };

    let verified = password::verify(submitted_password, &super_admin.password_hash)
        .map_err(AppError::Internal)?;
    if !verified {
        return Err(AppError::InvalidCredentials);
    }

    let user = reconcile_super_admin(pool, &email, &super_admin.password_hash, &super_admin.display_name)
        .await?;
    require_active(Principal::ReconciledSuperAdmin(user))
}

/// Re-resolve the principal for an already authenticated user id (company
/// switch, refresh). No password check, no mirroring; only the variant is
/// re-derived.
pub async fn principal_for(pool: &PgPool, user: User) -> Result<Principal, AppError> {
    if db::super_admins::find_by_email(pool, &user.email).await?.is_some() {
        Ok(Principal::ReconciledSuperAdmin(user))
    } else {
        Ok(Principal::OrdinaryUser(user))
    }
}

/// Materialize/refresh the mirror row and its Administrator grant in one
/// transaction. Both statements are conflict-tolerant, so concurrent logins
/// with the same credential converge on a single row and a single link.
async fn reconcile_super_admin(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    display_name: &str,
) -> Result<User, AppError> {
    let admin_role = db::roles::find_by_name(pool, ADMINISTRATOR_ROLE)
        .await?
        .ok_or_else(|| AppError::Config("Built-in Administrator role is missing".to_string()))?;

    let (first_name, last_name) = split_display_name(display_name);

    let mut tx = pool.begin().await?;
    let user =
        db::users::upsert_super_admin_mirror(&mut *tx, email, password_hash, &first_name, &last_name)
            .await?;
    db::user_roles::grant(&mut *tx, user.id, admin_role.id, None).await?;
    tx.commit().await?;

    Ok(user)
}

async fn ensure_administrator_role(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let admin_role = db::roles::find_by_name(pool, ADMINISTRATOR_ROLE)
        .await?
        .ok_or_else(|| AppError::Config("Built-in Administrator role is missing".to_string()))?;
    db::user_roles::grant(pool, user_id, admin_role.id, None).await?;
    Ok(())
}

fn require_active(principal: Principal) -> Result<Principal, AppError> {
    if principal.user().is_active {
        Ok(principal)
    } else {
        Err(AppError::AccountInactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email("  Admin@Example.COM "), "admin@example.com");
    }

    #[test]
    fn display_name_splits_first_and_rest() {
        assert_eq!(
            split_display_name("Jane van der Berg"),
            ("Jane".to_string(), "van der Berg".to_string())
        );
    }

    #[test]
    fn single_token_name_defaults_last_name() {
        assert_eq!(
            split_display_name("Root"),
            ("Root".to_string(), "Admin".to_string())
        );
    }

    #[test]
    fn empty_name_defaults_both() {
        assert_eq!(
            split_display_name("   "),
            ("Super".to_string(), "Admin".to_string())
        );
    }
}
