/// Task model and ownership-scoped database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     description TEXT NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Ownership scoping
///
/// Every read and write here takes the owner id and injects
/// `owner_id = $1` into the query. There is intentionally no
/// `find_by_id` without an owner: a task that exists but belongs to
/// someone else is indistinguishable from one that does not exist.
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Task owned by a user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user, fixed at creation
    #[serde(rename = "owner")]
    pub owner_id: Uuid,

    /// What needs doing (non-empty, trimmed)
    pub description: String,

    /// Whether the task is done
    pub completed: bool,

    /// When the task was created
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Description (already trimmed, non-empty)
    pub description: String,

    /// Initial completion state
    pub completed: bool,
}

/// Input for updating a task; only non-None fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New description (already trimmed, non-empty)
    pub description: Option<String>,

    /// New completion state
    pub completed: Option<bool>,
}

/// Sortable task fields, named as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Description,
    Completed,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Parses a wire-format field name
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "description" => Some(SortField::Description),
            "completed" => Some(SortField::Completed),
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }

    /// The SQL column backing this field
    fn column(&self) -> &'static str {
        match self {
            SortField::Description => "description",
            SortField::Completed => "completed",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

/// Requested sort order for a task listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub descending: bool,
}

impl TaskSort {
    /// Parses a `sortBy` value of the form `<field>_<direction>`
    ///
    /// Only the exact suffix `desc` sorts descending; any other suffix
    /// (or none) sorts ascending. Unknown fields yield None, which falls
    /// back to insertion order.
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = match raw.split_once('_') {
            Some((field, direction)) => (field, direction),
            None => (raw, ""),
        };

        Some(TaskSort {
            field: SortField::parse(field)?,
            descending: direction == "desc",
        })
    }
}

/// Query refinements for listing tasks, all optional and combinable
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    /// Filter on completion state
    pub completed: Option<bool>,

    /// Sort order; None means insertion order
    pub sort: Option<TaskSort>,

    /// Maximum number of rows to return
    pub limit: Option<i64>,

    /// Number of rows to skip
    pub skip: Option<i64>,
}

impl TaskFilter {
    /// Builds a filter from raw query-string values
    ///
    /// - `completed` present maps to the boolean `value == "true"`;
    ///   absent means no filter.
    /// - Non-numeric or negative `limit`/`skip` values are treated as
    ///   unset, never as zero.
    pub fn from_query(
        completed: Option<&str>,
        sort_by: Option<&str>,
        limit: Option<&str>,
        skip: Option<&str>,
    ) -> Self {
        TaskFilter {
            completed: completed.map(|value| value == "true"),
            sort: sort_by.and_then(TaskSort::parse),
            limit: parse_count(limit),
            skip: parse_count(skip),
        }
    }
}

/// Parses a non-negative count, treating anything unparseable as unset
fn parse_count(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value >= 0)
}

/// Columns returned by every task query
const TASK_COLUMNS: &str = "id, owner_id, description, completed, created_at, updated_at";

/// Renders the listing query for a filter
///
/// `completed`, when present, binds as `$2`; limit/skip are validated
/// non-negative integers and the sort column comes from a fixed enum, so
/// they are rendered inline.
fn list_query(filter: &TaskFilter) -> String {
    let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1");

    if filter.completed.is_some() {
        sql.push_str(" AND completed = $2");
    }

    match filter.sort {
        Some(sort) => {
            let direction = if sort.descending { "DESC" } else { "ASC" };
            sql.push_str(&format!(" ORDER BY {} {}", sort.field.column(), direction));
            // Tiebreaker keeps pagination deterministic for equal keys
            if sort.field != SortField::CreatedAt {
                sql.push_str(", created_at ASC");
            }
        }
        None => sql.push_str(" ORDER BY created_at ASC"),
    }

    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(skip) = filter.skip {
        sql.push_str(&format!(" OFFSET {skip}"));
    }

    sql
}

impl Task {
    /// Creates a task for the given owner
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (owner_id, description, completed)
            VALUES ($1, $2, $3)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(owner_id)
        .bind(data.description)
        .bind(data.completed)
        .fetch_one(pool)
        .await
    }

    /// Lists the owner's tasks, shaped by the filter
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = list_query(filter);

        let mut q = sqlx::query_as::<_, Task>(&sql).bind(owner_id);
        if let Some(completed) = filter.completed {
            q = q.bind(completed);
        }

        q.fetch_all(pool).await
    }

    /// Finds one task by id, scoped to the owner
    pub async fn find_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2",
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    /// Updates a task scoped to the owner, writing only present fields
    ///
    /// Returns None when the task does not exist or belongs to someone
    /// else; callers treat both as not found.
    pub async fn update_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.description.is_none() && data.completed.is_none() {
            return Self::find_for_owner(pool, owner_id, id).await;
        }

        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner_id);

        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a task scoped to the owner, returning the deleted row
    pub async fn delete_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}",
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse_known_fields() {
        let sort = TaskSort::parse("description_asc").unwrap();
        assert_eq!(sort.field, SortField::Description);
        assert!(!sort.descending);

        let sort = TaskSort::parse("completed_desc").unwrap();
        assert_eq!(sort.field, SortField::Completed);
        assert!(sort.descending);

        let sort = TaskSort::parse("createdAt_desc").unwrap();
        assert_eq!(sort.field, SortField::CreatedAt);
        assert!(sort.descending);

        let sort = TaskSort::parse("updatedAt_asc").unwrap();
        assert_eq!(sort.field, SortField::UpdatedAt);
        assert!(!sort.descending);
    }

    #[test]
    fn test_sort_parse_unknown_direction_is_ascending() {
        for raw in ["description_descending", "description_DESC", "description_up", "description"] {
            let sort = TaskSort::parse(raw).unwrap();
            assert!(!sort.descending, "'{}' should sort ascending", raw);
        }
    }

    #[test]
    fn test_sort_parse_unknown_field() {
        assert!(TaskSort::parse("owner_desc").is_none());
        assert!(TaskSort::parse("_desc").is_none());
        assert!(TaskSort::parse("").is_none());
    }

    #[test]
    fn test_filter_completed_values() {
        assert_eq!(
            TaskFilter::from_query(Some("true"), None, None, None).completed,
            Some(true)
        );
        assert_eq!(
            TaskFilter::from_query(Some("false"), None, None, None).completed,
            Some(false)
        );
        // Present but not "true" filters to false
        assert_eq!(
            TaskFilter::from_query(Some("banana"), None, None, None).completed,
            Some(false)
        );
        assert_eq!(
            TaskFilter::from_query(None, None, None, None).completed,
            None
        );
    }

    #[test]
    fn test_filter_counts_unset_when_unparseable() {
        let filter = TaskFilter::from_query(None, None, Some("abc"), Some("-3"));
        assert_eq!(filter.limit, None);
        assert_eq!(filter.skip, None);

        let filter = TaskFilter::from_query(None, None, Some("0"), Some("10"));
        assert_eq!(filter.limit, Some(0));
        assert_eq!(filter.skip, Some(10));
    }

    #[test]
    fn test_list_query_default_is_insertion_order() {
        let sql = list_query(&TaskFilter::default());
        assert!(sql.ends_with("ORDER BY created_at ASC"));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("OFFSET"));
        assert!(!sql.contains("AND completed"));
    }

    #[test]
    fn test_list_query_with_all_refinements() {
        let filter = TaskFilter::from_query(
            Some("true"),
            Some("description_desc"),
            Some("5"),
            Some("10"),
        );
        let sql = list_query(&filter);

        assert!(sql.contains("AND completed = $2"));
        assert!(sql.contains("ORDER BY description DESC, created_at ASC"));
        assert!(sql.contains("LIMIT 5"));
        assert!(sql.contains("OFFSET 10"));
    }

    #[test]
    fn test_list_query_created_at_sort_has_no_tiebreaker() {
        let filter = TaskFilter::from_query(None, Some("createdAt_desc"), None, None);
        let sql = list_query(&filter);
        assert!(sql.ends_with("ORDER BY created_at DESC"));
    }

    #[test]
    fn test_task_serialization_wire_names() {
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            description: "First task".to_string(),
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        let obj = json.as_object().unwrap();

        assert!(obj.contains_key("owner"));
        assert!(obj.contains_key("createdAt"));
        assert!(obj.contains_key("updatedAt"));
        assert!(!obj.contains_key("owner_id"));
    }
}
