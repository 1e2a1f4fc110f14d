//!
//! # Role-Based Authorization Guard
//!
//! A single pure policy check consulted by every protected route, plus the
//! explicit table of which roles each operation requires. Operations with an
//! empty requirement set are open to any authenticated caller.

use crate::error::AppError;
use crate::models::UserRole;

/// Every guarded operation the HTTP layer exposes onto the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ProjectCreate,
    ProjectList,
    ProjectGet,
    ProjectUpdate,
    ProjectRemove,
    ProjectListByManager,
    TaskCreate,
    TaskList,
    TaskGet,
    TaskUpdate,
    TaskRemove,
    TaskListByProject,
    TaskListByUser,
    TaskUpdateStatus,
    TaskStatistics,
    DashboardStats,
}

/// The fixed role policy, one row per operation.
///
/// An empty slice means "any authenticated caller".
pub fn required_roles(operation: Operation) -> &'static [UserRole] {
    use UserRole::{Admin, Manager};
    match operation {
        Operation::ProjectCreate | Operation::ProjectUpdate => &[Admin, Manager],
        Operation::ProjectRemove => &[Admin],
        Operation::TaskRemove => &[Admin, Manager],
        Operation::ProjectList
        | Operation::ProjectGet
        | Operation::ProjectListByManager
        | Operation::TaskCreate
        | Operation::TaskList
        | Operation::TaskGet
        | Operation::TaskUpdate
        | Operation::TaskListByProject
        | Operation::TaskListByUser
        | Operation::TaskUpdateStatus
        | Operation::TaskStatistics
        | Operation::DashboardStats => &[],
    }
}

/// Pure role check: allows when `required` is empty or contains the caller's
/// role, signals `Forbidden` otherwise. No IO, no other business logic.
pub fn authorize(role: UserRole, required: &[UserRole]) -> Result<(), AppError> {
    if required.is_empty() || required.contains(&role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Insufficient role for this operation".into(),
        ))
    }
}

/// Convenience wrapper used by route handlers.
pub fn authorize_operation(role: UserRole, operation: Operation) -> Result<(), AppError> {
    authorize(role, required_roles(operation))
}
