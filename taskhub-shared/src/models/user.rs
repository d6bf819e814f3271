/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     age INTEGER NOT NULL DEFAULT 0,
///     avatar BYTEA,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Emails are lowercased before they reach this layer, so the UNIQUE
/// constraint doubles as case-insensitive uniqueness.
///
/// # Serialization
///
/// The JSON shape of a user never includes `password_hash` or the avatar
/// blob; timestamps serialize in camelCase (`createdAt`/`updatedAt`) to
/// match the wire format of the rest of the API.
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name (non-empty, trimmed)
    pub name: String,

    /// Email address (unique, stored lowercase)
    pub email: String,

    /// Argon2id password hash (never serialized)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Age in years (default 0)
    pub age: i32,

    /// Avatar blob (250x250 PNG). Never serialized; fetched via the
    /// public avatar endpoint instead
    #[serde(skip_serializing)]
    pub avatar: Option<Vec<u8>>,

    /// When the account was created
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name (already trimmed)
    pub name: String,

    /// Email address (already lowercased)
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Age in years
    pub age: i32,
}

/// Input for updating an existing user
///
/// All fields are optional; only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,

    /// New email address (already lowercased)
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    /// New age
    pub age: Option<i32>,
}

impl UpdateUser {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.age.is_none()
    }
}

/// Columns returned by every user query
const USER_COLUMNS: &str = "id, name, email, password_hash, age, avatar, created_at, updated_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already taken (unique violation)
    /// or the database is unavailable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, age)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.age)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by email address
    ///
    /// Callers are expected to lowercase the email first.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Updates a user, writing only the fields present in `data`
    ///
    /// `updated_at` is always refreshed. Returns the updated row, or None
    /// if the user no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        // Build the UPDATE dynamically from the fields that are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.age.is_some() {
            bind_count += 1;
            query.push_str(&format!(", age = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(age) = data.age {
            q = q.bind(age);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a user and returns the deleted row
    ///
    /// Sessions and tasks owned by the user are removed by the schema's
    /// ON DELETE CASCADE clauses.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Stores the avatar blob for a user
    pub async fn set_avatar(pool: &PgPool, id: Uuid, png: &[u8]) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(png)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Clears the avatar field
    pub async fn clear_avatar(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET avatar = NULL, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Fetches just the avatar blob for a user
    ///
    /// Returns None when the user does not exist or has no avatar set;
    /// the public endpoint treats both as 404.
    pub async fn find_avatar(pool: &PgPool, id: Uuid) -> Result<Option<Vec<u8>>, sqlx::Error> {
        let row: Option<(Option<Vec<u8>>,)> =
            sqlx::query_as("SELECT avatar FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(row.and_then(|(avatar,)| avatar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Mike".to_string(),
            email: "mike@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            age: 30,
            avatar: Some(vec![0x89, 0x50, 0x4e, 0x47]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let json = serde_json::to_value(sample_user()).unwrap();
        let obj = json.as_object().unwrap();

        assert!(obj.contains_key("id"));
        assert!(obj.contains_key("name"));
        assert!(obj.contains_key("email"));
        assert!(obj.contains_key("age"));
        assert!(obj.contains_key("createdAt"));
        assert!(obj.contains_key("updatedAt"));

        assert!(!obj.contains_key("password_hash"));
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("avatar"));
        assert!(!obj.contains_key("tokens"));
    }

    #[test]
    fn test_update_user_is_empty() {
        assert!(UpdateUser::default().is_empty());
        assert!(!UpdateUser {
            name: Some("Jess".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
