/// Session model: one row per issued bearer token
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The rows for a user form their ordered token list: issuing a token
/// inserts a row, logout deletes one row, logout-all deletes them all,
/// and account deletion cascades. A token is live iff its row exists.
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Active session (issued token) for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// The exact signed token string handed to the client
    pub token: String,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Records a newly issued token
    pub async fn create(pool: &PgPool, user_id: Uuid, token: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token)
            VALUES ($1, $2)
            RETURNING id, user_id, token, created_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(pool)
        .await
    }

    /// Checks whether this exact token is live for the user
    pub async fn exists(pool: &PgPool, user_id: Uuid, token: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM sessions WHERE user_id = $1 AND token = $2")
                .bind(user_id)
                .bind(token)
                .fetch_optional(pool)
                .await?;

        Ok(row.is_some())
    }

    /// Lists a user's sessions in issue order
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token, created_at
            FROM sessions
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Deletes the session holding exactly this token (logout)
    pub async fn delete(pool: &PgPool, user_id: Uuid, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Deletes every session for the user (logout-all)
    pub async fn delete_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
