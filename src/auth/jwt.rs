use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access-credential claims: the full authorization snapshot for one session,
/// embedded so consumers verify statelessly without touching the store. The
/// snapshot is deliberately a copy; it goes stale until the next rotation.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,
    pub company_id: Uuid,
    pub company_slug: String,
    pub company_db_name: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub branch_ids: Vec<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        company_id: Uuid,
        company_slug: String,
        company_db_name: String,
        roles: Vec<String>,
        permissions: Vec<String>,
        branch_ids: Vec<Uuid>,
        ttl_minutes: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            company_id,
            company_slug,
            company_db_name,
            roles,
            permissions,
            branch_ids,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
        }
    }

    pub fn has_permission(&self, key: &str) -> bool {
        self.permissions.iter().any(|p| p == key)
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-unit-test-secret";

    fn sample_claims(ttl_minutes: i64) -> Claims {
        Claims::new(
            Uuid::now_v7(),
            Uuid::now_v7(),
            "acme".to_string(),
            "tenant_acme".to_string(),
            vec!["Management".to_string()],
            vec!["dashboard.view".to_string(), "shift.end_shift".to_string()],
            vec![Uuid::now_v7()],
            ttl_minutes,
        )
    }

    #[test]
    fn round_trip_preserves_snapshot() {
        let claims = sample_claims(15);
        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.company_slug, "acme");
        assert_eq!(decoded.company_db_name, "tenant_acme");
        assert_eq!(decoded.roles, claims.roles);
        assert_eq!(decoded.permissions, claims.permissions);
        assert_eq!(decoded.branch_ids, claims.branch_ids);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_token(&sample_claims(15), SECRET).unwrap();
        assert!(decode_token(&token, "some-other-secret-entirely").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = encode_token(&sample_claims(-5), SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = encode_token(&sample_claims(15), SECRET).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1] = parts[1].replace('a', "b");
        assert!(decode_token(&parts.join("."), SECRET).is_err());
    }

    #[test]
    fn has_permission_checks_membership() {
        let claims = sample_claims(15);
        assert!(claims.has_permission("shift.end_shift"));
        assert!(!claims.has_permission("pos.verify_transactions"));
    }
}
