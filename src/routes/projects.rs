use crate::{
    auth::{authorize_operation, CurrentUser, Operation},
    error::AppError,
    models::{CreateProjectInput, UpdateProjectInput},
    services::projects,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Create a new project. Admins and managers only.
#[post("")]
pub async fn create_project(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    project_data: web::Json<CreateProjectInput>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::ProjectCreate)?;
    project_data.validate()?;

    let project = projects::create(&pool, project_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(project))
}

/// List all projects with their managers resolved.
#[get("")]
pub async fn get_projects(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::ProjectList)?;

    let projects = projects::find_all(&pool).await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// List the projects managed by a given user.
#[get("/manager/{manager_id}")]
pub async fn get_projects_by_manager(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    manager_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::ProjectListByManager)?;

    let projects = projects::find_by_manager_id(&pool, manager_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// Fetch a single project with its manager and tasks resolved.
#[get("/{id}")]
pub async fn get_project(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::ProjectGet)?;

    let project = projects::find_one(&pool, project_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

/// Partially update a project. Admins and managers only.
#[patch("/{id}")]
pub async fn update_project(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    project_id: web::Path<Uuid>,
    project_data: web::Json<UpdateProjectInput>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::ProjectUpdate)?;
    project_data.validate()?;

    let project = projects::update(&pool, project_id.into_inner(), project_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

/// Delete a project and all of its tasks. Admins only.
#[delete("/{id}")]
pub async fn delete_project(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::ProjectRemove)?;

    projects::remove(&pool, project_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
