use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::task::Task;
use crate::models::user::UserResponse;

/// A project record as stored in the database. A project exclusively owns
/// its tasks; the storage layer cascades task removal on project deletion.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Optional reference to the managing user.
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing representation of a project with its manager reference
/// resolved. `tasks` is populated only by the single-project lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub manager: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
}

impl ProjectResponse {
    pub fn new(project: Project, manager: Option<UserResponse>) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            is_active: project.is_active,
            manager_id: project.manager_id,
            created_at: project.created_at,
            updated_at: project.updated_at,
            manager,
            tasks: None,
        }
    }
}

/// Input for creating a project.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Must resolve to an existing user when present.
    pub manager_id: Option<Uuid>,
}

/// Partial update for a project. An absent field means "leave unchanged".
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
    /// Re-validated against the user directory when present.
    pub manager_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_input_validation() {
        let valid = CreateProjectInput {
            name: "Website Redesign".to_string(),
            description: Some("Modernize the company website".to_string()),
            manager_id: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateProjectInput {
            name: "".to_string(),
            description: None,
            manager_id: None,
        };
        assert!(empty_name.validate().is_err());

        let long_description = CreateProjectInput {
            name: "Valid".to_string(),
            description: Some("d".repeat(1001)),
            manager_id: None,
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_project_response_omits_tasks_when_absent() {
        let project = Project {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            description: None,
            is_active: true,
            manager_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(ProjectResponse::new(project, None)).unwrap();
        assert!(json.get("tasks").is_none());
        assert!(json["manager"].is_null());
    }
}
