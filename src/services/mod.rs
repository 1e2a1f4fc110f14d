//! The domain service layer: all business rules live here, behind plain
//! async functions over the connection pool. The HTTP layer stays thin.

pub mod dashboard;
pub mod projects;
pub mod tasks;
pub mod users;
