//!
//! # Dashboard Aggregator
//!
//! Read-only composition over the task board, project registry and user
//! directory. The four underlying reads run concurrently; if any of them
//! fails the whole aggregation fails, there is no partial result.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{TaskResponse, TaskStatistics};
use crate::services::{projects, tasks, users};

/// Everything the dashboard view needs, computed for one caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardStats {
    pub task_stats: TaskStatistics,
    /// The caller's most recently created assigned tasks, at most five.
    pub recent_tasks: Vec<TaskResponse>,
    pub project_count: usize,
    pub user_count: usize,
    /// Number of projects whose manager is the caller.
    pub managed_projects: usize,
    pub assigned_tasks_count: usize,
}

pub async fn get_dashboard_stats(
    pool: &SqlitePool,
    caller_id: Uuid,
) -> Result<DashboardStats, AppError> {
    let (task_stats, assigned_tasks, all_projects, all_users) = futures::try_join!(
        tasks::get_task_statistics(pool),
        tasks::find_by_user(pool, caller_id),
        projects::find_all(pool),
        users::find_all(pool),
    )?;

    let managed_projects = all_projects
        .iter()
        .filter(|project| project.manager_id == Some(caller_id))
        .count();

    let assigned_tasks_count = assigned_tasks.len();
    let recent_tasks = assigned_tasks.into_iter().take(5).collect();

    Ok(DashboardStats {
        task_stats,
        recent_tasks,
        project_count: all_projects.len(),
        user_count: all_users.len(),
        managed_projects,
        assigned_tasks_count,
    })
}
