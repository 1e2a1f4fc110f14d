//!
//! # Database Setup
//!
//! Connection pool construction and schema bootstrap for the SQLite backing
//! store. The schema is embedded and applied idempotently at startup, so a
//! fresh database file (or an in-memory database in tests) is usable
//! immediately.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// One relational table per entity. Foreign keys implement the ownership
/// rules: deleting a project cascades to its tasks; deleting a user detaches
/// it from projects it manages and tasks it is assigned to.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            BLOB PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'user',
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id          BLOB PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    manager_id  BLOB REFERENCES users(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id               BLOB PRIMARY KEY,
    title            TEXT NOT NULL,
    description      TEXT,
    status           TEXT NOT NULL DEFAULT 'todo',
    priority         TEXT NOT NULL DEFAULT 'medium',
    due_date         TEXT,
    project_id       BLOB NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    assigned_user_id BLOB REFERENCES users(id) ON DELETE SET NULL,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks(project_id);
CREATE INDEX IF NOT EXISTS idx_tasks_assigned_user_id ON tasks(assigned_user_id);
CREATE INDEX IF NOT EXISTS idx_projects_manager_id ON projects(manager_id);
"#;

/// Creates a connection pool for the given SQLite URL.
///
/// The database file is created if missing and foreign key enforcement is
/// switched on for every connection (SQLite leaves it off by default).
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Applies the embedded schema. Safe to call on every startup.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA).execute(pool).await?;
    log::info!("Database schema is up to date");
    Ok(())
}
