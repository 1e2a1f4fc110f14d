use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// One-way hash of a plaintext password, salted, fixed cost factor.
///
/// Called explicitly by the user directory whenever a password is set or
/// changed; plaintext never reaches the database.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a plaintext password against a stored hash. A wrong password is
/// `Ok(false)`, never an error.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
