use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Role assigned to a user account, driving role-based access checks.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access, including project deletion and user administration.
    Admin,
    /// Can create and update projects and remove tasks.
    Manager,
    /// Default role for registered accounts.
    User,
}

/// A user record as stored in the database.
///
/// Carries the bcrypt password hash and is therefore never serialized to
/// clients; use [`UserResponse`] for anything that leaves the service.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing representation of a user. No password material.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Input for creating a user (registration or administrative creation).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// Plaintext password; hashed before persistence, never stored as-is.
    #[validate(length(min = 6))]
    pub password: String,
    /// Defaults to [`UserRole::User`] when absent.
    pub role: Option<UserRole>,
}

/// Partial update for a user. An absent field means "leave unchanged".
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    /// Re-hashed on its way in when present.
    #[validate(length(min = 6))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_input_validation() {
        let input = CreateUserInput {
            email: "test@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password: "password123".to_string(),
            role: None,
        };
        assert!(input.validate().is_ok());

        let invalid_email = CreateUserInput {
            email: "not-an-email".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password: "password123".to_string(),
            role: None,
        };
        assert!(invalid_email.validate().is_err());

        let short_password = CreateUserInput {
            email: "test@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password: "short".to_string(),
            role: None,
        };
        assert!(short_password.validate().is_err());

        let empty_first_name = CreateUserInput {
            email: "test@example.com".to_string(),
            first_name: "".to_string(),
            last_name: "User".to_string(),
            password: "password123".to_string(),
            role: None,
        };
        assert!(empty_first_name.validate().is_err());
    }

    #[test]
    fn test_user_response_excludes_password() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role: UserRole::User,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }
}
