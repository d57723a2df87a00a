use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    /// Access-credential lifetime in minutes.
    pub access_token_ttl_minutes: i64,
    /// Refresh-credential lifetime in days.
    pub refresh_token_ttl_days: i64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("CREWDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CREWDESK_HOST: {e}"))?;

        let port: u16 = env_or("CREWDESK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid CREWDESK_PORT: {e}"))?;

        let access_token_ttl_minutes: i64 = env_or("CREWDESK_ACCESS_TOKEN_TTL_MINUTES", "15")
            .parse()
            .map_err(|e| format!("Invalid CREWDESK_ACCESS_TOKEN_TTL_MINUTES: {e}"))?;

        let refresh_token_ttl_days: i64 = env_or("CREWDESK_REFRESH_TOKEN_TTL_DAYS", "7")
            .parse()
            .map_err(|e| format!("Invalid CREWDESK_REFRESH_TOKEN_TTL_DAYS: {e}"))?;

        let log_level = env_or("CREWDESK_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
