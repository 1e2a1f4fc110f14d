use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::project::Project;
use crate::models::user::UserResponse;

/// Represents the status of a task. Stored as lowercase snake_case text.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
}

/// Represents the priority of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// A task record as stored in the database. `project_id` is mandatory and
/// always points at an existing project; `assigned_user_id` is optional.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Uuid,
    pub assigned_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing representation of a task with its references resolved.
/// Listing endpoints resolve whichever side is not already implied by the
/// query (e.g. tasks-by-project resolves only the assignee).
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Uuid,
    pub assigned_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<UserResponse>,
}

impl TaskResponse {
    pub fn new(task: Task, project: Option<Project>, assigned_user: Option<UserResponse>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            project_id: task.project_id,
            assigned_user_id: task.assigned_user_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
            project,
            assigned_user,
        }
    }
}

/// Input for creating a task.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Defaults to [`TaskStatus::Todo`] when absent.
    pub status: Option<TaskStatus>,
    /// Defaults to [`TaskPriority::Medium`] when absent.
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    /// Must resolve to an existing project.
    pub project_id: Uuid,
    /// Must resolve to an existing user when present.
    pub assigned_user_id: Option<Uuid>,
}

/// Partial update for a task. An absent field means "leave unchanged".
/// Changed references are re-validated before anything is written.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
}

/// Body for the status-only update endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskStatusInput {
    pub status: TaskStatus,
}

/// Aggregate counts over the whole task board.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TaskStatistics {
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
    /// Percentage of tasks in `done`, 0 when there are no tasks at all.
    pub completion_rate: f64,
}
