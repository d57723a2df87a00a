use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crewdesk::auth::password;
use crewdesk::config::Config;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    // ── Fixtures (inserted directly; the core never creates these) ──

    pub async fn create_company(&self, name: &str, slug: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO companies (name, slug, db_name, theme_color)
             VALUES ($1, $2, $3, '#123456') RETURNING id",
        )
        .bind(name)
        .bind(slug)
        .bind(format!("tenant_{slug}"))
        .fetch_one(&self.pool)
        .await
        .expect("create company failed")
    }

    pub async fn deactivate_company(&self, id: Uuid) {
        sqlx::query("UPDATE companies SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .expect("deactivate company failed");
    }

    pub async fn create_user(&self, email: &str, pw: &str, first: &str, last: &str) -> Uuid {
        let hash = password::hash(pw).expect("hash failed");
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (email, password_hash, first_name, last_name)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(email)
        .bind(hash)
        .bind(first)
        .bind(last)
        .fetch_one(&self.pool)
        .await
        .expect("create user failed")
    }

    pub async fn deactivate_user(&self, id: Uuid) {
        sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .expect("deactivate user failed");
    }

    pub async fn create_super_admin(&self, email: &str, pw: &str, display_name: &str) -> Uuid {
        let hash = password::hash(pw).expect("hash failed");
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO super_admins (email, password_hash, display_name)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(email)
        .bind(hash)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .expect("create super admin failed")
    }

    pub async fn grant_access(&self, user_id: Uuid, company_id: Uuid) {
        sqlx::query(
            "INSERT INTO user_company_access (user_id, company_id) VALUES ($1, $2)
             ON CONFLICT (user_id, company_id) DO UPDATE SET is_active = TRUE",
        )
        .bind(user_id)
        .bind(company_id)
        .execute(&self.pool)
        .await
        .expect("grant access failed");
    }

    /// Create a role linked to the given (already seeded) permission keys.
    pub async fn create_role_with_permissions(
        &self,
        name: &str,
        priority: i32,
        keys: &[&str],
    ) -> Uuid {
        let role_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO roles (name, priority) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(priority)
        .fetch_one(&self.pool)
        .await
        .expect("create role failed");

        for key in keys {
            sqlx::query(
                "INSERT INTO role_permissions (role_id, permission_id)
                 SELECT $1, id FROM permissions WHERE key = $2",
            )
            .bind(role_id)
            .bind(key)
            .execute(&self.pool)
            .await
            .expect("link permission failed");
        }

        role_id
    }

    pub async fn assign_role(&self, user_id: Uuid, role_id: Uuid) {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .expect("assign role failed");
    }

    pub async fn create_branch(&self, company_id: Uuid, name: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO branches (company_id, name) VALUES ($1, $2) RETURNING id",
        )
        .bind(company_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .expect("create branch failed")
    }

    pub async fn assign_branch(&self, user_id: Uuid, branch_id: Uuid) {
        sqlx::query("INSERT INTO user_branch_assignments (user_id, branch_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(branch_id)
            .execute(&self.pool)
            .await
            .expect("assign branch failed");
    }

    pub async fn refresh_token_count(&self, user_id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .expect("count refresh tokens failed")
    }

    // ── HTTP helpers ────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        self.post_json(
            "/api/v1/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn login_with_slug(
        &self,
        email: &str,
        password: &str,
        slug: &str,
    ) -> (Value, StatusCode) {
        self.post_json(
            "/api/v1/auth/login",
            &json!({ "email": email, "password": password, "companySlug": slug }),
        )
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> (Value, StatusCode) {
        self.post_json(
            "/api/v1/auth/refresh",
            &json!({ "refreshToken": refresh_token }),
        )
        .await
    }

    pub async fn logout(&self, refresh_token: &str) -> (Value, StatusCode) {
        self.post_json(
            "/api/v1/auth/logout",
            &json!({ "refreshToken": refresh_token }),
        )
        .await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!(
        "crewdesk_test_{}",
        Uuid::now_v7().to_string().replace('-', "")
    );

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    crewdesk::db::seed::ensure_defaults(&pool)
        .await
        .expect("Failed to seed defaults");

    let config = Config {
        database_url: test_url,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        access_token_ttl_minutes: 15,
        refresh_token_ttl_days: 7,
        log_level: "warn".to_string(),
    };

    let (app, _state) = crewdesk::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
