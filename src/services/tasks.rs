//!
//! # Task Board
//!
//! CRUD over tasks plus aggregate statistics. Every task belongs to exactly
//! one project; the project reference is validated on create and whenever an
//! update supplies one, by asking the project registry. Assignee references
//! go through the user directory the same way. A failed lookup surfaces the
//! originating `NotFound` verbatim.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    CreateTaskInput, Project, Task, TaskPriority, TaskResponse, TaskStatistics, TaskStatus,
    UpdateTaskInput, UserResponse, UserRole,
};
use crate::services::{projects, users};

/// Flat row for a task joined with its project and (optional) assignee.
#[derive(FromRow)]
struct TaskWithRefsRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    project_id: Uuid,
    assigned_user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    au_id: Option<Uuid>,
    au_email: Option<String>,
    au_first_name: Option<String>,
    au_last_name: Option<String>,
    au_role: Option<UserRole>,
    au_is_active: Option<bool>,
    au_created_at: Option<DateTime<Utc>>,
    au_updated_at: Option<DateTime<Utc>>,
    p_id: Option<Uuid>,
    p_name: Option<String>,
    p_description: Option<String>,
    p_is_active: Option<bool>,
    p_manager_id: Option<Uuid>,
    p_created_at: Option<DateTime<Utc>>,
    p_updated_at: Option<DateTime<Utc>>,
}

const TASK_WITH_REFS: &str = "SELECT t.id, t.title, t.description, t.status, t.priority, t.due_date, t.project_id, \
     t.assigned_user_id, t.created_at, t.updated_at, \
     u.id AS au_id, u.email AS au_email, u.first_name AS au_first_name, u.last_name AS au_last_name, \
     u.role AS au_role, u.is_active AS au_is_active, u.created_at AS au_created_at, u.updated_at AS au_updated_at, \
     p.id AS p_id, p.name AS p_name, p.description AS p_description, p.is_active AS p_is_active, \
     p.manager_id AS p_manager_id, p.created_at AS p_created_at, p.updated_at AS p_updated_at \
     FROM tasks t \
     LEFT JOIN users u ON u.id = t.assigned_user_id \
     LEFT JOIN projects p ON p.id = t.project_id";

impl TaskWithRefsRow {
    fn into_response(self) -> TaskResponse {
        let assigned_user = match (
            self.au_id,
            self.au_email,
            self.au_first_name,
            self.au_last_name,
            self.au_role,
            self.au_is_active,
            self.au_created_at,
            self.au_updated_at,
        ) {
            (
                Some(id),
                Some(email),
                Some(first_name),
                Some(last_name),
                Some(role),
                Some(is_active),
                Some(created_at),
                Some(updated_at),
            ) => Some(UserResponse {
                id,
                email,
                first_name,
                last_name,
                role,
                is_active,
                created_at,
                updated_at,
            }),
            _ => None,
        };

        let project = match (
            self.p_id,
            self.p_name,
            self.p_is_active,
            self.p_created_at,
            self.p_updated_at,
        ) {
            (Some(id), Some(name), Some(is_active), Some(created_at), Some(updated_at)) => {
                Some(Project {
                    id,
                    name,
                    description: self.p_description,
                    is_active,
                    manager_id: self.p_manager_id,
                    created_at,
                    updated_at,
                })
            }
            _ => None,
        };

        TaskResponse {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
            project_id: self.project_id,
            assigned_user_id: self.assigned_user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            project,
            assigned_user,
        }
    }
}

/// Creates a task. The project reference is mandatory and must resolve; the
/// assignee is optional but must resolve when present. Nothing is persisted
/// if either lookup fails. Status defaults to `todo`, priority to `medium`.
pub async fn create(pool: &SqlitePool, input: CreateTaskInput) -> Result<Task, AppError> {
    projects::get_entity(pool, input.project_id).await?;

    if let Some(assigned_user_id) = input.assigned_user_id {
        users::find_one(pool, assigned_user_id).await?;
    }

    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        status: input.status.unwrap_or(TaskStatus::Todo),
        priority: input.priority.unwrap_or(TaskPriority::Medium),
        due_date: input.due_date,
        project_id: input.project_id,
        assigned_user_id: input.assigned_user_id,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO tasks (id, title, description, status, priority, due_date, project_id, \
         assigned_user_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(task.id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.due_date)
    .bind(task.project_id)
    .bind(task.assigned_user_id)
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(pool)
    .await?;

    log::info!("Created task {} in project {}", task.id, task.project_id);
    Ok(task)
}

/// Lists all tasks with both references resolved.
pub async fn find_all(pool: &SqlitePool) -> Result<Vec<TaskResponse>, AppError> {
    let rows = sqlx::query_as::<_, TaskWithRefsRow>(&format!(
        "{} ORDER BY t.created_at",
        TASK_WITH_REFS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(TaskWithRefsRow::into_response).collect())
}

/// Fetches the bare task record; fails with `NotFound` if absent.
pub async fn get_entity(pool: &SqlitePool, id: Uuid) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(
        "SELECT id, title, description, status, priority, due_date, project_id, assigned_user_id, \
         created_at, updated_at FROM tasks WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Task with ID \"{}\" not found", id)))
}

/// Fetches a single task with its references resolved; fails with `NotFound`
/// if absent.
pub async fn find_one(pool: &SqlitePool, id: Uuid) -> Result<TaskResponse, AppError> {
    let row = sqlx::query_as::<_, TaskWithRefsRow>(&format!("{} WHERE t.id = ?", TASK_WITH_REFS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task with ID \"{}\" not found", id)))?;

    Ok(row.into_response())
}

/// Applies a partial update. Reads the record first (`NotFound` dominates),
/// then re-validates any supplied project or assignee reference before the
/// merged record is written. Absent fields are left unchanged.
pub async fn update(pool: &SqlitePool, id: Uuid, input: UpdateTaskInput) -> Result<Task, AppError> {
    let mut task = get_entity(pool, id).await?;

    if let Some(project_id) = input.project_id {
        projects::get_entity(pool, project_id).await?;
        task.project_id = project_id;
    }
    if let Some(assigned_user_id) = input.assigned_user_id {
        users::find_one(pool, assigned_user_id).await?;
        task.assigned_user_id = Some(assigned_user_id);
    }
    if let Some(title) = input.title {
        task.title = title;
    }
    if let Some(description) = input.description {
        task.description = Some(description);
    }
    if let Some(status) = input.status {
        task.status = status;
    }
    if let Some(priority) = input.priority {
        task.priority = priority;
    }
    if let Some(due_date) = input.due_date {
        task.due_date = Some(due_date);
    }
    task.updated_at = Utc::now();

    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?, due_date = ?, \
         project_id = ?, assigned_user_id = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.due_date)
    .bind(task.project_id)
    .bind(task.assigned_user_id)
    .bind(task.updated_at)
    .bind(task.id)
    .execute(pool)
    .await?;

    Ok(task)
}

/// Moves a task to a new status. Any status may move to any other status;
/// no transition order is enforced.
pub async fn update_status(
    pool: &SqlitePool,
    id: Uuid,
    status: TaskStatus,
) -> Result<Task, AppError> {
    let mut task = get_entity(pool, id).await?;
    task.status = status;
    task.updated_at = Utc::now();

    sqlx::query("UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?")
        .bind(task.status)
        .bind(task.updated_at)
        .bind(task.id)
        .execute(pool)
        .await?;

    Ok(task)
}

/// Removes a task. Fails with `NotFound` if absent.
pub async fn remove(pool: &SqlitePool, id: Uuid) -> Result<(), AppError> {
    let task = get_entity(pool, id).await?;

    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task.id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Lists the tasks of one project, assignees resolved.
pub async fn find_by_project(
    pool: &SqlitePool,
    project_id: Uuid,
) -> Result<Vec<TaskResponse>, AppError> {
    let rows = sqlx::query_as::<_, TaskWithRefsRow>(&format!(
        "{} WHERE t.project_id = ? ORDER BY t.created_at",
        TASK_WITH_REFS
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    // The project is implied by the query; only the assignee is resolved.
    Ok(rows
        .into_iter()
        .map(|row| {
            let mut response = row.into_response();
            response.project = None;
            response
        })
        .collect())
}

/// Lists the tasks assigned to one user, most recent first, projects
/// resolved.
pub async fn find_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<TaskResponse>, AppError> {
    let rows = sqlx::query_as::<_, TaskWithRefsRow>(&format!(
        "{} WHERE t.assigned_user_id = ? ORDER BY t.created_at DESC",
        TASK_WITH_REFS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let mut response = row.into_response();
            response.assigned_user = None;
            response
        })
        .collect())
}

/// Aggregate counts over the whole board. The four counts are issued
/// concurrently; the completion rate is 0 when the board is empty.
pub async fn get_task_statistics(pool: &SqlitePool) -> Result<TaskStatistics, AppError> {
    let total_q = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks").fetch_one(pool);
    let todo_q = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE status = ?")
        .bind(TaskStatus::Todo)
        .fetch_one(pool);
    let in_progress_q = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE status = ?")
        .bind(TaskStatus::InProgress)
        .fetch_one(pool);
    let done_q = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE status = ?")
        .bind(TaskStatus::Done)
        .fetch_one(pool);

    let (total, todo, in_progress, done) =
        futures::try_join!(total_q, todo_q, in_progress_q, done_q)?;

    let completion_rate = if total > 0 {
        (done as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    Ok(TaskStatistics {
        total,
        todo,
        in_progress,
        done,
        completion_rate,
    })
}
