use crate::{
    auth::{authorize_operation, CurrentUser, Operation},
    error::AppError,
    services::dashboard,
};
use actix_web::{get, web, HttpResponse, Responder};
use sqlx::SqlitePool;

/// Aggregated statistics for the authenticated caller's dashboard.
#[get("")]
pub async fn get_dashboard(
    pool: web::Data<SqlitePool>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    authorize_operation(current.role, Operation::DashboardStats)?;

    let stats = dashboard::get_dashboard_stats(&pool, current.id).await?;
    Ok(HttpResponse::Ok().json(stats))
}
