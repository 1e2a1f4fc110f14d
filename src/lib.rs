#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain service layer (users, projects, tasks,"]
#![doc = "dashboard), authentication and role-based authorization, the database"]
#![doc = "setup, routing configuration, and error handling for the TaskHub"]
#![doc = "application. It is used by the main binary (`main.rs`) to construct"]
#![doc = "and run the application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

pub use crate::error::AppError;
