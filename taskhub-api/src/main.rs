//! # TaskHub API Server
//!
//! HTTP backend for the TaskHub task manager.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - User accounts with bearer-token authentication
//! - Per-user task CRUD with filtering, sorting, and pagination
//! - Avatar image upload, normalized to 250x250 PNG
//! - Fire-and-forget welcome and cancellation emails
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskhub-api
//! ```

use taskhub_api::{
    app::{build_router, AppState},
    config::Config,
    mailer::Mailer,
};
use taskhub_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(config.database.pool_config()).await?;
    migrations::run_migrations(&db).await?;
    tracing::info!("Database ready");

    let mailer = Mailer::from_config(&config.mail)?;
    if mailer.is_enabled() {
        tracing::info!("Mail transport configured");
    } else {
        tracing::info!("Mail transport not configured, notifications disabled");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, mailer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
