//!
//! # Project Registry
//!
//! CRUD over projects. Manager references are validated against the user
//! directory at create and update time; a failed lookup surfaces the
//! originating `NotFound` verbatim. Deleting a project cascades the removal
//! of its tasks at the storage layer.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    CreateProjectInput, Project, ProjectResponse, Task, UpdateProjectInput, UserResponse, UserRole,
};
use crate::services::users;

/// Flat row for a project joined with its (optional) manager.
#[derive(FromRow)]
struct ProjectWithManagerRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    is_active: bool,
    manager_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    m_id: Option<Uuid>,
    m_email: Option<String>,
    m_first_name: Option<String>,
    m_last_name: Option<String>,
    m_role: Option<UserRole>,
    m_is_active: Option<bool>,
    m_created_at: Option<DateTime<Utc>>,
    m_updated_at: Option<DateTime<Utc>>,
}

const PROJECT_WITH_MANAGER: &str = "SELECT p.id, p.name, p.description, p.is_active, p.manager_id, p.created_at, p.updated_at, \
     u.id AS m_id, u.email AS m_email, u.first_name AS m_first_name, u.last_name AS m_last_name, \
     u.role AS m_role, u.is_active AS m_is_active, u.created_at AS m_created_at, u.updated_at AS m_updated_at \
     FROM projects p LEFT JOIN users u ON u.id = p.manager_id";

impl ProjectWithManagerRow {
    fn into_response(self) -> ProjectResponse {
        let manager = match (
            self.m_id,
            self.m_email,
            self.m_first_name,
            self.m_last_name,
            self.m_role,
            self.m_is_active,
            self.m_created_at,
            self.m_updated_at,
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

        ProjectResponse {
            id: self.id,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            manager_id: self.manager_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            manager,
            tasks: None,
        }
    }
}

/// Creates a project. When a manager is supplied it must resolve to an
/// existing user; the lookup's `NotFound` propagates unchanged. New projects
/// start out active.
pub async fn create(pool: &SqlitePool, input: CreateProjectInput) -> Result<Project, AppError> {
    if let Some(manager_id) = input.manager_id {
        users::find_one(pool, manager_id).await?;
    }

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4(),
        name: input.name,
        description: input.description,
        is_active: true,
        manager_id: input.manager_id,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO projects (id, name, description, is_active, manager_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(project.id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.is_active)
    .bind(project.manager_id)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(pool)
    .await?;

    log::info!("Created project {}", project.id);
    Ok(project)
}

/// Lists all projects with their manager references resolved.
pub async fn find_all(pool: &SqlitePool) -> Result<Vec<ProjectResponse>, AppError> {
    let rows = sqlx::query_as::<_, ProjectWithManagerRow>(&format!(
        "{} ORDER BY p.created_at",
        PROJECT_WITH_MANAGER
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProjectWithManagerRow::into_response).collect())
}

/// Fetches the bare project record; fails with `NotFound` if absent. Used
/// internally and by the task board for reference validation.
pub async fn get_entity(pool: &SqlitePool, id: Uuid) -> Result<Project, AppError> {
    sqlx::query_as::<_, Project>(
        "SELECT id, name, description, is_active, manager_id, created_at, updated_at \
         FROM projects WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Project with ID \"{}\" not found", id)))
}

/// Fetches a single project with its manager and tasks resolved; fails with
/// `NotFound` if absent.
pub async fn find_one(pool: &SqlitePool, id: Uuid) -> Result<ProjectResponse, AppError> {
    let row = sqlx::query_as::<_, ProjectWithManagerRow>(&format!(
        "{} WHERE p.id = ?",
        PROJECT_WITH_MANAGER
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Project with ID \"{}\" not found", id)))?;

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, title, description, status, priority, due_date, project_id, assigned_user_id, \
         created_at, updated_at FROM tasks WHERE project_id = ? ORDER BY created_at",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let mut response = row.into_response();
    response.tasks = Some(tasks);
    Ok(response)
}

/// Applies a partial update. Reads the record first (`NotFound` dominates),
/// then re-validates the manager reference if one was supplied. Absent
/// fields are left unchanged.
pub async fn update(
    pool: &SqlitePool,
    id: Uuid,
    input: UpdateProjectInput,
) -> Result<Project, AppError> {
    let mut project = get_entity(pool, id).await?;

    if let Some(manager_id) = input.manager_id {
        users::find_one(pool, manager_id).await?;
        project.manager_id = Some(manager_id);
    }
    if let Some(name) = input.name {
        project.name = name;
    }
    if let Some(description) = input.description {
        project.description = Some(description);
    }
    if let Some(is_active) = input.is_active {
        project.is_active = is_active;
    }
    project.updated_at = Utc::now();

    sqlx::query(
        "UPDATE projects SET name = ?, description = ?, is_active = ?, manager_id = ?, \
         updated_at = ? WHERE id = ?",
    )
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.is_active)
    .bind(project.manager_id)
    .bind(project.updated_at)
    .bind(project.id)
    .execute(pool)
    .await?;

    Ok(project)
}

/// Removes a project and, through the foreign key, every task it owns.
/// Fails with `NotFound` if absent.
pub async fn remove(pool: &SqlitePool, id: Uuid) -> Result<(), AppError> {
    let project = get_entity(pool, id).await?;

    sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(project.id)
        .execute(pool)
        .await?;

    log::info!("Removed project {} (tasks cascaded)", project.id);
    Ok(())
}

/// Lists the projects managed by the given user, manager resolved.
pub async fn find_by_manager_id(
    pool: &SqlitePool,
    manager_id: Uuid,
) -> Result<Vec<ProjectResponse>, AppError> {
    let rows = sqlx::query_as::<_, ProjectWithManagerRow>(&format!(
        "{} WHERE p.manager_id = ? ORDER BY p.created_at",
        PROJECT_WITH_MANAGER
    ))
    .bind(manager_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProjectWithManagerRow::into_response).collect())
}
