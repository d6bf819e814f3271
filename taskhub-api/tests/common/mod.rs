/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (migrations run on first connect)
/// - Test user creation with a real password hash
/// - Token issuance
/// - Request/response helpers
///
/// Tests that use `TestContext` require a running PostgreSQL and the
/// `DATABASE_URL`/`JWT_SECRET` environment variables, so they are all
/// marked `#[ignore]`. Run them with `cargo test -- --ignored`.
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use sqlx::PgPool;
use taskhub_api::app::{build_router, AppState};
use taskhub_api::config::Config;
use taskhub_api::mailer::Mailer;
use taskhub_shared::auth::{password, session};
use taskhub_shared::db::migrations;
use taskhub_shared::models::user::{CreateUser, User};
use tower::ServiceExt;
use uuid::Uuid;

/// Password used for every test account
pub const TEST_PASSWORD: &str = "s*EVwC4PW7J@lQ83";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user and a valid token
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;
        migrations::run_migrations(&db).await?;

        let user = create_test_user(&db).await?;
        let token = session::issue_token(&db, &config.jwt.secret, user.id).await?;

        // Mail transport stays disabled so tests never touch SMTP
        let state = AppState::new(db.clone(), config.clone(), Mailer::disabled());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<axum::body::Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Cleans up test data (tasks and sessions cascade with the user)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Creates a user directly in the database with a unique email
pub async fn create_test_user(db: &PgPool) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            name: "Test User".to_string(),
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: password::hash_password(TEST_PASSWORD)?,
            age: 27,
        },
    )
    .await?;

    Ok(user)
}

/// Builds a JSON request, attaching the bearer token when given
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a bodyless request, attaching the bearer token when given
pub fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Reads a response body as JSON, panicking with the body text on
/// unexpected status so failures are debuggable
pub async fn json_body(
    response: Response<axum::body::Body>,
    expected: StatusCode,
) -> serde_json::Value {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    if status != expected {
        panic!(
            "Expected {}, got {}: {}",
            expected,
            status,
            String::from_utf8_lossy(&body)
        );
    }

    if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    }
}
