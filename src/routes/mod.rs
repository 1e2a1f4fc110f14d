pub mod auth;
pub mod dashboard;
pub mod health;
pub mod projects;
pub mod tasks;

use actix_web::web;

/// Registers every route under the `/api` scope. Literal paths are
/// registered before their `{id}` siblings so that, e.g.,
/// `GET /tasks/statistics` is not swallowed by `GET /tasks/{id}`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register),
    )
    .service(
        web::scope("/projects")
            .service(projects::get_projects_by_manager)
            .service(projects::create_project)
            .service(projects::get_projects)
            .service(projects::get_project)
            .service(projects::update_project)
            .service(projects::delete_project),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_task_statistics)
            .service(tasks::get_tasks_by_project)
            .service(tasks::get_tasks_by_user)
            .service(tasks::update_task_status)
            .service(tasks::create_task)
            .service(tasks::get_tasks)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(web::scope("/dashboard").service(dashboard::get_dashboard));
}
