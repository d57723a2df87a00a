use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::models::Company;
use crate::session::Principal;

/// Choose exactly one company scope for the session.
///
/// With a requested slug the company must exist and be active, and a
/// non-super-admin must hold an active access grant for it. Without a slug
/// the accessible set is computed (everything active for a super-admin), the
/// principal's last-selected company is preferred, and the first entry of
/// the name-ordered set is the fallback.
pub async fn resolve(
    pool: &PgPool,
    principal: &Principal,
    requested_slug: Option<&str>,
) -> Result<Company, AppError> {
    if let Some(slug) = requested_slug {
        let company = db::companies::find_active_by_slug(pool, slug)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        if !principal.is_super_admin()
            && !db::company_access::has_active_access(pool, principal.id(), company.id).await?
        {
            return Err(AppError::CompanyAccessDenied);
        }

        return Ok(company);
    }

    let accessible = accessible_companies(pool, principal).await?;
    if accessible.is_empty() {
        return Err(AppError::NoAccessibleCompany);
    }

    let chosen = principal
        .user()
        .last_company_id
        .and_then(|last| accessible.iter().find(|c| c.id == last))
        .unwrap_or(&accessible[0])
        .clone();

    // Super-admin fallback bootstrap: persist the grant so subsequent
    // slug-less logins resolve to the same company.
    if principal.is_super_admin() {
        db::company_access::grant(pool, principal.id(), chosen.id).await?;
    }

    Ok(chosen)
}

/// Companies the principal may select for login/switch, ordered by name then
/// creation time. A super-admin bypasses the access table entirely.
pub async fn accessible_companies(
    pool: &PgPool,
    principal: &Principal,
) -> Result<Vec<Company>, AppError> {
    let companies = if principal.is_super_admin() {
        db::companies::list_active(pool).await?
    } else {
        db::companies::list_accessible(pool, principal.id()).await?
    };
    Ok(companies)
}
