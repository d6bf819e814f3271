/// User endpoints: signup, login, session management, profile, avatar
///
/// # Endpoints
///
/// - `POST /users` - Signup (public)
/// - `POST /users/login` - Login (public)
/// - `POST /users/logout` - Revoke this request's token
/// - `POST /users/logout-all` - Revoke every token
/// - `GET /users/me` - Current profile
/// - `PATCH /users/me` - Update profile (strict field allow-list)
/// - `DELETE /users/me` - Delete account (tasks cascade)
/// - `POST /users/me/avatar` - Upload avatar (multipart, field `avatar`)
/// - `DELETE /users/me/avatar` - Clear avatar
/// - `GET /users/:id/avatar` - Fetch avatar PNG (public)
use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Cursor;
use uuid::Uuid;
use validator::ValidateEmail;

use taskhub_shared::{
    auth::{password, session},
    models::user::{CreateUser, UpdateUser, User},
};

use crate::{
    app::{AppState, AuthSession, AVATAR_MAX_BYTES},
    error::{ApiError, ApiResult},
};

/// Fields a profile PATCH may touch; anything else rejects the request
const ALLOWED_UPDATE_FIELDS: [&str; 4] = ["name", "email", "password", "age"];

/// Signup request body
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Raw password (hashed before storage)
    pub password: String,

    /// Age in years (optional, defaults to 0)
    pub age: Option<i64>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Raw password
    pub password: String,
}

/// Response for signup and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The user (password and avatar are never serialized)
    pub user: User,

    /// Freshly issued bearer token
    pub token: String,
}

/// Signup
///
/// Validates the profile fields, persists the user, dispatches the
/// welcome email without waiting on it, and issues a first token.
///
/// # Errors
///
/// - `422`: invalid name/email/password/age, or email already in use
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let name = normalize_name(&req.name)?;
    let email = normalize_email(&req.email)?;
    let password_hash = hash_valid_password(&req.password)?;
    let age = normalize_age(req.age)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name,
            email,
            password_hash,
            age,
        },
    )
    .await?;

    // Best-effort; the response never waits on the mail transport
    state.mailer.send_welcome(&user.email, &user.name);

    let token = session::issue_token(&state.db, state.jwt_secret(), user.id).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// Login
///
/// Appends a new token to the session list; other sessions stay valid.
///
/// # Errors
///
/// - `401`: unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = session::verify_credentials(&state.db, &req.email, &req.password).await?;
    let token = session::issue_token(&state.db, state.jwt_secret(), user.id).await?;

    Ok(Json(AuthResponse { user, token }))
}

/// Logout: revoke only the token used for this request
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<StatusCode> {
    session::revoke_token(&state.db, auth.user.id, &auth.token).await?;
    Ok(StatusCode::OK)
}

/// Logout-all: revoke every token for this user
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<StatusCode> {
    session::revoke_all_tokens(&state.db, auth.user.id).await?;
    Ok(StatusCode::OK)
}

/// Get the authenticated user's profile
pub async fn me(Extension(auth): Extension<AuthSession>) -> Json<User> {
    Json(auth.user)
}

/// Update profile
///
/// The body must be a JSON object whose keys are a subset of
/// `{name, email, password, age}`. Any other key rejects the whole
/// request before anything is written; there is no partial application.
///
/// # Errors
///
/// - `422 {"error": "Invalid updates!"}`: disallowed key present
/// - `422`: an allowed field fails validation
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Json(body): Json<Value>,
) -> ApiResult<Json<User>> {
    let fields = body
        .as_object()
        .ok_or_else(|| ApiError::Validation("Expected a JSON object".to_string()))?;

    if fields
        .keys()
        .any(|key| !ALLOWED_UPDATE_FIELDS.contains(&key.as_str()))
    {
        return Err(ApiError::Validation("Invalid updates!".to_string()));
    }

    let mut update = UpdateUser::default();

    if let Some(value) = fields.get("name") {
        let raw = value
            .as_str()
            .ok_or_else(|| ApiError::Validation("name must be a string".to_string()))?;
        update.name = Some(normalize_name(raw)?);
    }
    if let Some(value) = fields.get("email") {
        let raw = value
            .as_str()
            .ok_or_else(|| ApiError::Validation("email must be a string".to_string()))?;
        update.email = Some(normalize_email(raw)?);
    }
    if let Some(value) = fields.get("password") {
        let raw = value
            .as_str()
            .ok_or_else(|| ApiError::Validation("password must be a string".to_string()))?;
        update.password_hash = Some(hash_valid_password(raw)?);
    }
    if let Some(value) = fields.get("age") {
        let raw = value
            .as_i64()
            .ok_or_else(|| ApiError::Validation("age must be an integer".to_string()))?;
        update.age = Some(normalize_age(Some(raw))?);
    }

    let user = User::update(&state.db, auth.user.id, update)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(user))
}

/// Delete account
///
/// Tasks and sessions cascade away with the user row; the cancellation
/// email is dispatched without blocking the response.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<User>> {
    let user = User::delete(&state.db, auth.user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    state.mailer.send_cancellation(&user.email, &user.name);

    Ok(Json(user))
}

/// Upload avatar
///
/// Accepts a multipart field named `avatar` with a `.jpg`/`.jpeg`/`.png`
/// filename (case-sensitive suffix) of at most 1,000,000 bytes. The
/// image is resized to exactly 250x250 and re-encoded as PNG.
///
/// # Errors
///
/// - `422 {"error": message}`: missing field, wrong extension, oversized
///   payload, or undecodable image. The stored avatar is untouched.
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    mut multipart: Multipart,
) -> ApiResult<StatusCode> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Malformed multipart body".to_string()))?
    {
        if field.name() == Some("avatar") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|_| ApiError::Validation("Avatar must be 1MB or smaller".to_string()))?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::Validation("Please upload an avatar image".to_string()))?;

    if !has_image_extension(&filename) {
        return Err(ApiError::Validation(
            "Please upload a jpg, jpeg, or png file.".to_string(),
        ));
    }

    if data.len() > AVATAR_MAX_BYTES {
        return Err(ApiError::Validation(
            "Avatar must be 1MB or smaller".to_string(),
        ));
    }

    let png = process_avatar(&data)?;
    User::set_avatar(&state.db, auth.user.id, &png).await?;

    Ok(StatusCode::OK)
}

/// Clear avatar
pub async fn delete_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<StatusCode> {
    User::clear_avatar(&state.db, auth.user.id).await?;
    Ok(StatusCode::OK)
}

/// Fetch avatar (public)
///
/// # Errors
///
/// - `404`: user id malformed or unknown, or no avatar set
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound)?;

    let avatar = User::find_avatar(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], avatar).into_response())
}

/// Trims and requires a non-empty name
fn normalize_name(raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Trims, lowercases, and syntax-checks an email
fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    if !email.validate_email() {
        return Err(ApiError::Validation("email is invalid".to_string()));
    }
    Ok(email)
}

/// Applies the password policy and hashes on success
fn hash_valid_password(raw: &str) -> Result<String, ApiError> {
    password::validate_password(raw).map_err(ApiError::Validation)?;
    Ok(password::hash_password(raw)?)
}

/// Requires a non-negative age that fits the column; None defaults to 0
fn normalize_age(raw: Option<i64>) -> Result<i32, ApiError> {
    match raw {
        None => Ok(0),
        Some(age) if (0..=i32::MAX as i64).contains(&age) => Ok(age as i32),
        Some(_) => Err(ApiError::Validation(
            "age must be a non-negative integer".to_string(),
        )),
    }
}

/// Case-sensitive suffix match on the uploaded filename
fn has_image_extension(filename: &str) -> bool {
    filename.ends_with(".jpg") || filename.ends_with(".jpeg") || filename.ends_with(".png")
}

/// Decodes an uploaded image, resizes to exactly 250x250, encodes PNG
fn process_avatar(data: &[u8]) -> Result<Vec<u8>, ApiError> {
    let decoded = image::load_from_memory(data)
        .map_err(|_| ApiError::Validation("Could not decode avatar image".to_string()))?;

    let resized = decoded.resize_exact(250, 250, image::imageops::FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| ApiError::Internal(format!("Failed to encode avatar PNG: {}", e)))?;

    Ok(out.into_inner())
}
