use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::config::Config;
use crate::error::AppError;
use crate::models::{Company, Role};
use crate::session::{company, identity, orchestrator};
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub company_slug: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchCompanyRequest {
    pub company_slug: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub company_slug: String,
    pub company_name: String,
    pub company_theme_color: String,
    pub user: SessionUser,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub employee_number: Option<String>,
    pub roles: Vec<RoleSummary>,
    pub permissions: Vec<String>,
    pub branch_ids: Vec<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: Uuid,
    pub name: String,
    pub priority: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub theme_color: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<&Role> for RoleSummary {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            name: role.name.clone(),
            priority: role.priority,
        }
    }
}

impl From<&Company> for CompanySummary {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
            slug: company.slug.clone(),
            theme_color: company.theme_color.clone(),
        }
    }
}

impl From<orchestrator::SessionOutcome> for SessionResponse {
    fn from(outcome: orchestrator::SessionOutcome) -> Self {
        Self {
            access_token: outcome.tokens.access_token,
            refresh_token: outcome.tokens.refresh_token,
            company_slug: outcome.company.slug,
            company_name: outcome.company.name,
            company_theme_color: outcome.company.theme_color,
            user: SessionUser {
                id: outcome.user.id,
                email: outcome.user.email,
                first_name: outcome.user.first_name,
                last_name: outcome.user.last_name,
                avatar_url: outcome.user.avatar_url,
                employee_number: outcome.user.employee_number,
                roles: outcome.snapshot.roles.iter().map(RoleSummary::from).collect(),
                permissions: outcome.snapshot.permissions,
                branch_ids: outcome.snapshot.branch_ids,
            },
        }
    }
}

fn auth_cookies(config: &Config, access_token: &str, refresh_token: &str) -> CookieJar {
    let access = Cookie::build(("access_token", access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(config.access_token_ttl_minutes))
        .build();

    let refresh = Cookie::build(("refresh_token", refresh_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(config.refresh_token_ttl_days))
        .build();

    CookieJar::new().add(access).add(refresh)
}

fn clear_auth_cookies() -> CookieJar {
    let access = Cookie::build(("access_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    let refresh = Cookie::build(("refresh_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(access).add(refresh)
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let outcome = orchestrator::login(
        &state,
        &req.email,
        &req.password,
        req.company_slug.as_deref(),
    )
    .await?;

    let jar = auth_cookies(
        &state.config,
        &outcome.tokens.access_token,
        &outcome.tokens.refresh_token,
    );
    Ok((jar, Json(outcome.into())))
}

pub async fn switch_company(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<SwitchCompanyRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let outcome = orchestrator::switch_company(&state, auth.user_id, &req.company_slug).await?;

    let jar = auth_cookies(
        &state.config,
        &outcome.tokens.access_token,
        &outcome.tokens.refresh_token,
    );
    Ok((jar, Json(outcome.into())))
}

pub async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<TokenPairResponse>), AppError> {
    let raw = body
        .and_then(|Json(req)| req.refresh_token)
        .or_else(|| jar.get("refresh_token").map(|c| c.value().to_string()))
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".to_string()))?;

    let tokens = orchestrator::refresh(&state, &raw).await?;

    let new_jar = auth_cookies(&state.config, &tokens.access_token, &tokens.refresh_token);
    Ok((
        new_jar,
        Json(TokenPairResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> (CookieJar, Json<LogoutResponse>) {
    let raw = body
        .and_then(|Json(req)| req.refresh_token)
        .or_else(|| jar.get("refresh_token").map(|c| c.value().to_string()));

    if let Some(raw) = raw {
        orchestrator::logout(&state, &raw).await;
    }

    (clear_auth_cookies(), Json(LogoutResponse { success: true }))
}

pub async fn companies(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<Vec<CompanySummary>>, AppError> {
    let user = crate::db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    let principal = identity::principal_for(&state.pool, user).await?;

    let companies = company::accessible_companies(&state.pool, &principal).await?;
    Ok(Json(companies.iter().map(CompanySummary::from).collect()))
}

pub async fn change_password(
    State(state): State<SharedState>,
    auth: AuthUser,
    jar: CookieJar,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    if req.new_password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // The session initiating the change keeps its refresh credential out of
    // the mass revocation; it may arrive in the body or the cookie.
    let presented = req
        .refresh_token
        .clone()
        .or_else(|| jar.get("refresh_token").map(|c| c.value().to_string()));

    let outcome = orchestrator::change_password(
        &state,
        auth.user_id,
        &req.current_password,
        &req.new_password,
        presented.as_deref(),
    )
    .await?;

    let new_jar = auth_cookies(
        &state.config,
        &outcome.tokens.access_token,
        &outcome.tokens.refresh_token,
    );
    Ok((new_jar, Json(outcome.into())))
}
