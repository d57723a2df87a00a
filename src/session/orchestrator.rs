use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::jwt::{self, Claims};
use crate::auth::{password, tokens};
use crate::db;
use crate::error::AppError;
use crate::models::{Company, User};
use crate::session::authorization::{self, AuthorizationSnapshot};
use crate::session::company;
use crate::session::identity::{self, normalize_email};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Everything a successful login/switch returns to the transport layer.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub tokens: IssuedTokens,
    pub user: User,
    pub company: Company,
    pub snapshot: AuthorizationSnapshot,
}

/// Login: reconcile identity, pick a company scope, load the authorization
/// snapshot, mint the credential pair, persist the ledger row, then stamp
/// the user row. The stage order is the contract; the ledger insert happens
/// before anything is returned so no credential exists without its row.
pub async fn login(
    state: &AppState,
    email: &str,
    submitted_password: &str,
    company_slug: Option<&str>,
) -> Result<SessionOutcome, AppError> {
    let normalized = normalize_email(email);
    if let Err(retry_after) = state.login_limiter.check(&normalized) {
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {retry_after} seconds."
        )));
    }

    let principal = match identity::authenticate(&state.pool, email, submitted_password).await {
        Ok(principal) => principal,
        Err(AppError::InvalidCredentials) => {
            state.login_limiter.record_failure(&normalized);
            return Err(AppError::InvalidCredentials);
        }
        Err(other) => return Err(other),
    };

    let company = company::resolve(&state.pool, &principal, company_slug).await?;
    let snapshot = authorization::load(&state.pool, &principal, &company).await?;
    let tokens = issue_session(state, principal.user(), &company, &snapshot).await?;

    db::users::record_login(&state.pool, principal.id(), company.id, Utc::now()).await?;

    if !principal.user().is_profile_complete {
        // Onboarding nudges live outside this core; they key off this signal.
        tracing::info!(user_id = %principal.id(), "Login with incomplete profile");
    }

    db::audit::record(
        &state.pool,
        Some(company.id),
        Some(principal.id()),
        "user.login",
        "user",
        Some(principal.id()),
        None,
    )
    .await;

    Ok(SessionOutcome {
        tokens,
        user: principal.into_user(),
        company,
        snapshot,
    })
}

/// Re-authorization for an already authenticated principal. Deliberately no
/// password check: the caller proved identity by presenting a valid access
/// credential for another company scope under the same user id.
pub async fn switch_company(
    state: &AppState,
    user_id: Uuid,
    company_slug: &str,
) -> Result<SessionOutcome, AppError> {
    let user = db::users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    if !user.is_active {
        return Err(AppError::AccountInactive);
    }

    let principal = identity::principal_for(&state.pool, user).await?;
    let company = company::resolve(&state.pool, &principal, Some(company_slug)).await?;
    let snapshot = authorization::load(&state.pool, &principal, &company).await?;
    let tokens = issue_session(state, principal.user(), &company, &snapshot).await?;

    db::users::set_last_company(&state.pool, principal.id(), company.id).await?;

    db::audit::record(
        &state.pool,
        Some(company.id),
        Some(principal.id()),
        "user.company_switched",
        "company",
        Some(company.id),
        None,
    )
    .await;

    Ok(SessionOutcome {
        tokens,
        user: principal.into_user(),
        company,
        snapshot,
    })
}

/// Rotate a refresh credential. The redeem step atomically revokes the
/// presented credential; of two concurrent calls with the same value exactly
/// one reaches this line with a row. The snapshot is re-derived from the
/// store on purpose, so role changes made mid-session take effect within one
/// refresh cycle without re-login.
pub async fn refresh(state: &AppState, raw_refresh: &str) -> Result<IssuedTokens, AppError> {
    let presented_hash = tokens::hash_token(raw_refresh);
    let row = db::refresh_tokens::redeem(&state.pool, &presented_hash)
        .await?
        .ok_or(AppError::InvalidRefreshToken)?;

    let user = db::users::find_by_id(&state.pool, row.user_id)
        .await?
        .ok_or(AppError::InvalidRefreshToken)?;
    if !user.is_active {
        return Err(AppError::AccountInactive);
    }

    let company = db::companies::find_by_id(&state.pool, row.company_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or(AppError::CompanyNotFound)?;

    let principal = identity::principal_for(&state.pool, user).await?;
    let snapshot = authorization::load(&state.pool, &principal, &company).await?;
    issue_session(state, principal.user(), &company, &snapshot).await
}

/// Best-effort revocation. A client discarding stale tokens must always
/// succeed from its point of view, so every failure is swallowed here.
pub async fn logout(state: &AppState, raw_refresh: &str) {
    let presented_hash = tokens::hash_token(raw_refresh);
    if let Err(e) = db::refresh_tokens::revoke(&state.pool, &presented_hash).await {
        tracing::warn!("Logout revocation failed: {e}");
    }
}

/// Verify the current password, store the new hash, revoke every other
/// active session, then issue a fresh pair for the session that initiated
/// the change. `presented_refresh` identifies that session; its old
/// credential is revoked too and replaced by the returned pair.
pub async fn change_password(
    state: &AppState,
    user_id: Uuid,
    current_password: &str,
    new_password: &str,
    presented_refresh: Option<&str>,
) -> Result<SessionOutcome, AppError> {
    let user = db::users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    if !user.is_active {
        return Err(AppError::AccountInactive);
    }

    let verified =
        password::verify(current_password, &user.password_hash).map_err(AppError::Internal)?;
    if !verified {
        return Err(AppError::InvalidCredentials);
    }

    let new_hash = password::hash(new_password).map_err(AppError::Internal)?;
    db::users::update_password(&state.pool, user.id, &new_hash).await?;

    let keep_hash = presented_refresh.map(tokens::hash_token);
    let revoked =
        db::refresh_tokens::revoke_all_except(&state.pool, user.id, keep_hash.as_deref()).await?;
    tracing::info!(user_id = %user.id, revoked, "Password changed, other sessions revoked");

    let principal = identity::principal_for(&state.pool, user).await?;
    let company = company::resolve(&state.pool, &principal, None).await?;
    let snapshot = authorization::load(&state.pool, &principal, &company).await?;
    let tokens = issue_session(state, principal.user(), &company, &snapshot).await?;

    db::audit::record(
        &state.pool,
        Some(company.id),
        Some(principal.id()),
        "user.password_changed",
        "user",
        Some(principal.id()),
        None,
    )
    .await;

    Ok(SessionOutcome {
        tokens,
        user: principal.into_user(),
        company,
        snapshot,
    })
}

/// Mint the credential pair and persist the ledger row for the refresh half.
/// The raw refresh value is returned to the caller and never stored.
async fn issue_session(
    state: &AppState,
    user: &User,
    company: &Company,
    snapshot: &AuthorizationSnapshot,
) -> Result<IssuedTokens, AppError> {
    let claims = Claims::new(
        user.id,
        company.id,
        company.slug.clone(),
        company.db_name.clone(),
        snapshot.role_names(),
        snapshot.permissions.clone(),
        snapshot.branch_ids.clone(),
        state.config.access_token_ttl_minutes,
    );
    let access_token =
        jwt::encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let refresh_token = tokens::generate_refresh_token();
    let refresh_hash = tokens::hash_token(&refresh_token);
    db::refresh_tokens::issue(
        &state.pool,
        user.id,
        company.id,
        &company.db_name,
        &refresh_hash,
        Utc::now() + Duration::days(state.config.refresh_token_ttl_days),
    )
    .await?;

    Ok(IssuedTokens {
        access_token,
        refresh_token,
    })
}
