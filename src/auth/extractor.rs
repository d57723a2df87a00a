use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::jwt;
use crate::error::AppError;
use crate::state::SharedState;

/// The verified authorization snapshot of the caller, decoded from the access
/// credential. No store access happens here; the token is self-describing.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub company_slug: String,
    pub company_db_name: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub branch_ids: Vec<Uuid>,
}

impl AuthUser {
    pub fn require_permission(&self, key: &str) -> Result<(), AppError> {
        if self.permissions.iter().any(|p| p == key) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Missing permission: {key}")))
        }
    }

    fn from_claims(claims: jwt::Claims) -> Self {
        Self {
            user_id: claims.sub,
            company_id: claims.company_id,
            company_slug: claims.company_slug,
            company_db_name: claims.company_db_name,
            roles: claims.roles,
            permissions: claims.permissions,
            branch_ids: claims.branch_ids,
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        // Try Bearer token from Authorization header first
        if let Some(auth_header) = parts.headers.get("authorization") {
            let auth_str = auth_header
                .to_str()
                .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let claims = jwt::decode_token(token, &state.config.jwt_secret)
                    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
                return Ok(AuthUser::from_claims(claims));
            }
        }

        // Try cookie-based auth
        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get("access_token") {
            let claims = jwt::decode_token(cookie.value(), &state.config.jwt_secret)
                .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
            return Ok(AuthUser::from_claims(claims));
        }

        Err(AppError::Unauthorized(
            "Missing authentication token".to_string(),
        ))
    }
}
