use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Company, Role};
use crate::session::Principal;

/// The effective authorization of a principal within one company, embedded
/// verbatim into the access credential. A snapshot, not a live reference;
/// role or permission changes surface at the next rotation.
#[derive(Debug, Clone)]
pub struct AuthorizationSnapshot {
    pub roles: Vec<Role>,
    pub permissions: Vec<String>,
    pub branch_ids: Vec<Uuid>,
}

impl AuthorizationSnapshot {
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }
}

/// Compute the snapshot. Roles come back highest priority first; permissions
/// are the distinct union over those roles, except that a super-admin gets
/// the entire catalog by construction rather than by role assignment.
/// Branches are scoped to the resolved company: all active ones for a
/// super-admin, the assigned subset otherwise.
pub async fn load(
    pool: &PgPool,
    principal: &Principal,
    company: &Company,
) -> Result<AuthorizationSnapshot, AppError> {
    let roles = db::roles::list_for_user(pool, principal.id()).await?;

    let permissions = if principal.is_super_admin() {
        db::roles::all_permission_keys(pool).await?
    } else {
        db::roles::permission_keys_for_user(pool, principal.id()).await?
    };

    let branch_ids = if principal.is_super_admin() {
        db::branches::active_ids_for_company(pool, company.id).await?
    } else {
        db::branches::assigned_ids_for_user(pool, principal.id(), company.id).await?
    };

    Ok(AuthorizationSnapshot {
        roles,
        permissions,
        branch_ids,
    })
}
