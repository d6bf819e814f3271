/// Task endpoints, all ownership-scoped to the authenticated user
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task
/// - `GET /tasks` - List tasks (`completed`, `sortBy`, `limit`, `skip`)
/// - `GET /tasks/:id` - Fetch one task
/// - `PATCH /tasks/:id` - Update (strict field allow-list)
/// - `DELETE /tasks/:id` - Delete, returning the deleted task
///
/// A task id that exists but belongs to another user is
/// indistinguishable from one that does not exist: both are `404`.
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use taskhub_shared::models::task::{CreateTask, Task, TaskFilter, UpdateTask};

use crate::{
    app::{AppState, AuthSession},
    error::{ApiError, ApiResult},
};

/// Fields a task PATCH may touch
const ALLOWED_UPDATE_FIELDS: [&str; 2] = ["description", "completed"];

/// Create-task request body
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task description
    pub description: String,

    /// Completion state (defaults to false)
    pub completed: Option<bool>,
}

/// Raw query parameters for task listing; parsing and defaulting
/// happen in [`TaskFilter::from_query`] so bad values degrade instead
/// of erroring
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// `"true"` keeps completed tasks, anything else keeps open ones
    pub completed: Option<String>,

    /// `field` or `field_desc`, e.g. `createdAt_desc`
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,

    /// Page size
    pub limit: Option<String>,

    /// Rows to skip
    pub skip: Option<String>,
}

/// Create a task owned by the authenticated user
///
/// # Errors
///
/// - `422`: empty description
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let description = normalize_description(&req.description)?;

    let task = Task::create(
        &state.db,
        auth.user.id,
        CreateTask {
            description,
            completed: req.completed.unwrap_or(false),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the authenticated user's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let filter = TaskFilter::from_query(
        query.completed.as_deref(),
        query.sort_by.as_deref(),
        query.limit.as_deref(),
        query.skip.as_deref(),
    );

    let tasks = Task::list_for_owner(&state.db, auth.user.id, &filter).await?;

    Ok(Json(tasks))
}

/// Fetch one task by id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = Task::find_for_owner(&state.db, auth.user.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(task))
}

/// Update a task
///
/// The body must be a JSON object whose keys are a subset of
/// `{description, completed}`; any other key rejects the whole
/// request before anything is written.
///
/// # Errors
///
/// - `422 {"error": "Invalid operation"}`: disallowed key present
/// - `422`: empty description or non-boolean completed
/// - `404`: task missing or owned by someone else
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let fields = body
        .as_object()
        .ok_or_else(|| ApiError::Validation("Expected a JSON object".to_string()))?;

    if fields
        .keys()
        .any(|key| !ALLOWED_UPDATE_FIELDS.contains(&key.as_str()))
    {
        return Err(ApiError::Validation("Invalid operation".to_string()));
    }

    let mut update = UpdateTask::default();

    if let Some(value) = fields.get("description") {
        let raw = value
            .as_str()
            .ok_or_else(|| ApiError::Validation("description must be a string".to_string()))?;
        update.description = Some(normalize_description(raw)?);
    }
    if let Some(value) = fields.get("completed") {
        update.completed = Some(value.as_bool().ok_or_else(|| {
            ApiError::Validation("completed must be a boolean".to_string())
        })?);
    }

    let task = Task::update_for_owner(&state.db, auth.user.id, id, update)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(task))
}

/// Delete a task, returning the deleted row
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = Task::delete_for_owner(&state.db, auth.user.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(task))
}

/// Trims and requires a non-empty description
fn normalize_description(raw: &str) -> Result<String, ApiError> {
    let description = raw.trim();
    if description.is_empty() {
        return Err(ApiError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    Ok(description.to_string())
}

/// A malformed id reads the same as an unknown one
fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}
