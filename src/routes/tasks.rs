use crate::{
    auth::{authorize_operation, CurrentUser, Operation},
    error::AppError,
    models::{CreateTaskInput, UpdateTaskInput, UpdateTaskStatusInput},
    services::tasks,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Create a new task. The project reference must resolve; a missing project
/// or assignee is answered with the lookup's own 404.
#[post("")]
pub async fn create_task(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    task_data: web::Json<CreateTaskInput>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::TaskCreate)?;
    task_data.validate()?;

    let task = tasks::create(&pool, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// List all tasks with assignees and projects resolved.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::TaskList)?;

    let tasks = tasks::find_all(&pool).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Aggregate counts over the whole board.
#[get("/statistics")]
pub async fn get_task_statistics(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::TaskStatistics)?;

    let statistics = tasks::get_task_statistics(&pool).await?;
    Ok(HttpResponse::Ok().json(statistics))
}

/// List the tasks of one project.
#[get("/project/{project_id}")]
pub async fn get_tasks_by_project(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::TaskListByProject)?;

    let tasks = tasks::find_by_project(&pool, project_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// List the tasks assigned to one user, most recent first.
#[get("/user/{user_id}")]
pub async fn get_tasks_by_user(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::TaskListByUser)?;

    let tasks = tasks::find_by_user(&pool, user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Fetch a single task with its references resolved.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::TaskGet)?;

    let task = tasks::find_one(&pool, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially update a task, re-validating any changed references.
#[patch("/{id}")]
pub async fn update_task(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<UpdateTaskInput>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::TaskUpdate)?;
    task_data.validate()?;

    let task = tasks::update(&pool, task_id.into_inner(), task_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Move a task to a new status. Any status may move to any other.
#[patch("/{id}/status")]
pub async fn update_task_status(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    task_id: web::Path<Uuid>,
    status_data: web::Json<UpdateTaskStatusInput>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::TaskUpdateStatus)?;

    let task = tasks::update_status(&pool, task_id.into_inner(), status_data.status).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Delete a task. Admins and managers only.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::TaskRemove)?;

    tasks::remove(&pool, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
