//!
//! # User Directory
//!
//! CRUD over user records. Enforces email uniqueness, owns role assignment,
//! and is the only place where password hashing is invoked: `create` and
//! `update` call into `auth::password` explicitly before anything is
//! persisted, so plaintext never reaches the database.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::{CreateUserInput, UpdateUserInput, User, UserRole};

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, role, is_active, created_at, updated_at";

/// Creates a user. Fails with `Conflict` when the email is already taken;
/// the role defaults to `user` when absent.
pub async fn create(pool: &SqlitePool, input: CreateUserInput) -> Result<User, AppError> {
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(&input.email)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
        password_hash: hash_password(&input.password)?,
        role: input.role.unwrap_or(UserRole::User),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO users (id, email, first_name, last_name, password_hash, role, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .bind(user.role)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await?;

    log::info!("Created user {} ({:?})", user.id, user.role);
    Ok(user)
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY created_at",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Looks up a single user; fails with `NotFound` if absent. Other services
/// call this to validate user references, and the resulting error surfaces
/// to their callers verbatim.
pub async fn find_one(pool: &SqlitePool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with ID \"{}\" not found", id)))
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Looks up a user that exists *and* is active. Session validation goes
/// through here so that tokens held by deactivated accounts stop working on
/// the next request.
pub async fn find_active_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = ? AND is_active = 1",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Applies a partial update. Reads the record first (`NotFound` dominates),
/// re-hashes the password if one was supplied, and rejects an email change
/// that collides with another account. Absent fields are left unchanged.
pub async fn update(pool: &SqlitePool, id: Uuid, input: UpdateUserInput) -> Result<User, AppError> {
    let mut user = find_one(pool, id).await?;

    if let Some(email) = input.email {
        if email != user.email {
            let taken: Option<Uuid> =
                sqlx::query_scalar("SELECT id FROM users WHERE email = ? AND id != ?")
                    .bind(&email)
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
            if taken.is_some() {
                return Err(AppError::Conflict("Email already exists".into()));
            }
            user.email = email;
        }
    }
    if let Some(first_name) = input.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        user.last_name = last_name;
    }
    if let Some(password) = input.password {
        user.password_hash = hash_password(&password)?;
    }
    if let Some(role) = input.role {
        user.role = role;
    }
    if let Some(is_active) = input.is_active {
        user.is_active = is_active;
    }
    user.updated_at = Utc::now();

    sqlx::query(
        "UPDATE users SET email = ?, first_name = ?, last_name = ?, password_hash = ?, \
         role = ?, is_active = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .bind(user.role)
    .bind(user.is_active)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(pool)
    .await?;

    Ok(user)
}

/// Removes a user. Fails with `NotFound` if absent. Foreign keys detach the
/// user from managed projects and assigned tasks (`ON DELETE SET NULL`).
pub async fn remove(pool: &SqlitePool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "User with ID \"{}\" not found",
            id
        )));
    }

    log::info!("Removed user {}", id);
    Ok(())
}
