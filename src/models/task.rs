use crate::models::user::{PublicUser, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is finished.
    Completed,
}

/// Input structure for creating or updating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// The status of the task. Defaults to `pending` when not provided.
    #[serde(default)]
    pub status: TaskStatus,

    /// Optional user the task is assigned to. The identifier format is
    /// checked at deserialization; the referenced user is not required
    /// to exist (reads populate `null` for a dangling reference).
    pub assigned_to: Option<Uuid>,
}

/// Represents a task entity as stored in the database.
#[derive(Debug, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// The current status of the task.
    pub status: TaskStatus,
    /// Identifier of the user to whom the task is assigned (optional).
    pub assigned_to: Option<Uuid>,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` from `TaskInput`.
    /// Sets `created_at` and `updated_at` to the current time and `id` to a new UUID.
    pub fn new(input: TaskInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            assigned_to: input.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A task joined with the public projection of its assignee, as returned
/// by the read endpoints. `assigned_to` is `null` when the task is
/// unassigned or when the stored reference no longer resolves.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assigned_to: Option<PublicUser>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row shape produced by the task/user LEFT JOIN queries.
#[derive(Debug, FromRow)]
pub struct TaskRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assignee_id: Option<Uuid>,
    pub assignee_username: Option<String>,
    pub assignee_email: Option<String>,
    pub assignee_role: Option<Role>,
    pub assignee_created_at: Option<DateTime<Utc>>,
}

impl From<TaskRow> for TaskView {
    fn from(row: TaskRow) -> Self {
        // All assignee columns come from the same joined row, so either the
        // id is present along with the rest, or the whole projection is None.
        let assigned_to = match (
            row.assignee_id,
            row.assignee_username,
            row.assignee_email,
            row.assignee_role,
            row.assignee_created_at,
        ) {
            (Some(id), Some(username), Some(email), Some(role), Some(created_at)) => {
                Some(PublicUser {
                    id,
                    username,
                    email,
                    role,
                    created_at,
                })
            }
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_task_creation_defaults() {
        let input: TaskInput = serde_json::from_value(serde_json::json!({
            "title": "T"
        }))
        .unwrap();
        assert_eq!(input.status, TaskStatus::Pending);

        let task = Task::new(input);
        assert_eq!(task.title, "T");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.description.is_none());
        assert!(task.assigned_to.is_none());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_task_input_validation() {
        let empty_title = TaskInput {
            title: "".to_string(),
            description: None,
            status: TaskStatus::Pending,
            assigned_to: None,
        };
        assert!(empty_title.validate().is_err());

        let long_title = TaskInput {
            title: "a".repeat(201),
            description: None,
            status: TaskStatus::Pending,
            assigned_to: None,
        };
        assert!(long_title.validate().is_err());

        let long_description = TaskInput {
            title: "Valid".to_string(),
            description: Some("b".repeat(1001)),
            status: TaskStatus::InProgress,
            assigned_to: None,
        };
        assert!(long_description.validate().is_err());

        let valid = TaskInput {
            title: "Valid".to_string(),
            description: Some("fine".to_string()),
            status: TaskStatus::Completed,
            assigned_to: Some(Uuid::new_v4()),
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"pending\"").unwrap(),
            TaskStatus::Pending
        );
        assert!(serde_json::from_str::<TaskStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_invalid_assigned_to_rejected_at_deserialization() {
        let result = serde_json::from_value::<TaskInput>(serde_json::json!({
            "title": "T",
            "assignedTo": "not-a-uuid"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_dangling_assignee_maps_to_null() {
        let row = TaskRow {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            description: None,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            assignee_id: None,
            assignee_username: None,
            assignee_email: None,
            assignee_role: None,
            assignee_created_at: None,
        };

        let view: TaskView = row.into();
        assert!(view.assigned_to.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["assignedTo"].is_null());
    }

    #[test]
    fn test_populated_assignee() {
        let assignee_id = Uuid::new_v4();
        let row = TaskRow {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            description: Some("d".to_string()),
            status: TaskStatus::InProgress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            assignee_id: Some(assignee_id),
            assignee_username: Some("bob".to_string()),
            assignee_email: Some("b@x.com".to_string()),
            assignee_role: Some(Role::User),
            assignee_created_at: Some(Utc::now()),
        };

        let view: TaskView = row.into();
        let assignee = view.assigned_to.expect("assignee should be populated");
        assert_eq!(assignee.id, assignee_id);
        assert_eq!(assignee.username, "bob");
    }
}
