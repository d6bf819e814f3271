/// Credential and token service
///
/// Ties the stateless JWT layer to server-side session rows. A token is
/// only accepted while an exact matching row exists in the `sessions`
/// table for the embedded user, which makes logout/logout-all effective
/// immediately even though the token's signature remains valid.
///
/// Authentication failures are deliberately flat: callers cannot tell
/// "unknown email" from "wrong password", nor "bad signature" from
/// "revoked token".
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    jwt::{self, JwtError},
    password::{self, PasswordError},
};
use crate::models::{session::Session, user::User};

/// Error type for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password (indistinguishable by design)
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, revoked, or orphaned token
    #[error("unauthenticated")]
    Unauthenticated,

    /// Token signing failed
    #[error(transparent)]
    Token(#[from] JwtError),

    /// Password hashing infrastructure failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Looks up a user by email and verifies the password
///
/// The email is trimmed and lowercased before lookup, matching the
/// normalization applied at signup.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` when the email is unknown or
/// the password does not match, without revealing which.
pub async fn verify_credentials(
    pool: &PgPool,
    email: &str,
    raw_password: &str,
) -> Result<User, AuthError> {
    let normalized = email.trim().to_lowercase();

    let user = User::find_by_email(pool, &normalized)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if password::verify_password(raw_password, &user.password_hash)? {
        Ok(user)
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// Signs a new token for the user and appends it to their session list
///
/// Existing sessions are untouched: logging in from a second client does
/// not invalidate the first.
pub async fn issue_token(pool: &PgPool, secret: &str, user_id: Uuid) -> Result<String, AuthError> {
    let token = jwt::create_token(&jwt::Claims::new(user_id), secret)?;
    Session::create(pool, user_id, &token).await?;
    Ok(token)
}

/// Removes exactly the given token from the user's session list (logout)
pub async fn revoke_token(pool: &PgPool, user_id: Uuid, token: &str) -> Result<(), AuthError> {
    Session::delete(pool, user_id, token).await?;
    Ok(())
}

/// Removes every token for the user (logout-all)
pub async fn revoke_all_tokens(pool: &PgPool, user_id: Uuid) -> Result<(), AuthError> {
    Session::delete_all_for_user(pool, user_id).await?;
    Ok(())
}

/// Resolves a bearer token to its user
///
/// Verifies the signature, requires a live session row holding this exact
/// token string for the embedded user id, and loads the user. Every
/// failure mode collapses into `AuthError::Unauthenticated`.
pub async fn resolve_token(pool: &PgPool, secret: &str, token: &str) -> Result<User, AuthError> {
    let claims = jwt::validate_token(token, secret).map_err(|_| AuthError::Unauthenticated)?;

    if !Session::exists(pool, claims.sub, token).await? {
        return Err(AuthError::Unauthenticated);
    }

    User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::Unauthenticated)
}
