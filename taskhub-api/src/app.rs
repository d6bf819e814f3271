/// Application state and router builder
///
/// Defines the shared application state, the bearer-token middleware, and
/// the function that assembles the Axum router.
///
/// # Example
///
/// ```no_run
/// use taskhub_api::{app::AppState, config::Config, mailer::Mailer};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let mailer = Mailer::from_config(&config.mail)?;
/// let state = AppState::new(pool, config, mailer);
/// let app = taskhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::{auth::session, models::user::User};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, mailer::Mailer, routes};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound notification dispatcher
    pub mailer: Mailer,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Mailer) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets the token-signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Authenticated caller, attached to request extensions by `auth_layer`
///
/// Carries the resolved user and the exact token string used for this
/// request, so logout can revoke precisely this session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user
    pub user: User,

    /// The bearer token presented on this request
    pub token: String,
}

/// Maximum accepted avatar upload, in bytes
pub const AVATAR_MAX_BYTES: usize = 1_000_000;

/// Builds the complete Axum router
///
/// # Routes
///
/// ```text
/// Public:
///   POST /users               signup
///   POST /users/login         login
///   GET  /users/:id/avatar    avatar fetch
///   GET  /health              health check
/// Bearer-authenticated (everything else):
///   POST   /users/logout, /users/logout-all
///   GET/PATCH/DELETE /users/me
///   POST/DELETE /users/me/avatar
///   POST/GET /tasks, GET/PATCH/DELETE /tasks/:id
/// ```
///
/// # Middleware Stack
///
/// 1. Request tracing (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer auth on the protected sub-router
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/users", post(routes::users::signup))
        .route("/users/login", post(routes::users::login))
        .route("/users/:id/avatar", get(routes::users::get_avatar))
        .route("/health", get(routes::health::health_check));

    let protected_routes = Router::new()
        .route("/users/logout", post(routes::users::logout))
        .route("/users/logout-all", post(routes::users::logout_all))
        .route(
            "/users/me",
            get(routes::users::me)
                .patch(routes::users::update_me)
                .delete(routes::users::delete_me),
        )
        .route(
            "/users/me/avatar",
            post(routes::users::upload_avatar)
                .delete(routes::users::delete_avatar)
                // Leave headroom over the avatar cap so oversized uploads
                // reach the handler's own 422 instead of a bare 413
                .layer(DefaultBodyLimit::max(AVATAR_MAX_BYTES * 2)),
        )
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bearer-token authentication middleware
///
/// Extracts the `Authorization: Bearer <token>` header and resolves it
/// through the session service. On success the `AuthSession` lands in
/// request extensions; on any failure the request short-circuits with
/// 401 and an empty body, and the downstream handler never runs.
async fn auth_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match bearer_token(&req) {
        Some(token) => token.to_string(),
        None => return StatusCode::UNAUTHORIZED.into_response(),
    };

    let user = match session::resolve_token(&state.db, state.jwt_secret(), &token).await {
        Ok(user) => user,
        Err(_) => return StatusCode::UNAUTHORIZED.into_response(),
    };

    req.extensions_mut().insert(AuthSession { user, token });

    next.run(req).await
}

/// Pulls the bearer token out of the Authorization header, if any
fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
