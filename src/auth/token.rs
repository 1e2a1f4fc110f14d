use crate::error::AppError;
use crate::models::UserRole;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token lifetime when `JWT_EXPIRATION_SECS` is not set: one hour.
const DEFAULT_EXPIRATION_SECS: i64 = 3600;

/// Represents the claims encoded within a session token.
///
/// The token is self-contained: no server-side session store exists, expiry
/// is the only invalidation mechanism. Deactivating an account takes effect
/// on the next request because the middleware re-checks the active flag.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    /// Email of the user at token issue time.
    pub email: String,
    /// Role of the user at token issue time.
    pub role: UserRole,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
}

fn secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::InternalServerError("JWT_SECRET not set".into()))
}

fn expiration_secs() -> i64 {
    std::env::var("JWT_EXPIRATION_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_EXPIRATION_SECS)
}

/// Generates a signed session token asserting the given identity and role.
///
/// Requires the `JWT_SECRET` environment variable for signing. The lifetime
/// comes from `JWT_EXPIRATION_SECS` (default one hour).
pub fn generate_token(user_id: Uuid, email: &str, role: UserRole) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::seconds(expiration_secs()))
        .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        exp: expiration.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret()?.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a session token and decodes its claims.
///
/// Returns `AppError::Unauthorized` if the token is malformed, its signature
/// is invalid, or it has expired.
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret()?.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::sync::Mutex;

    static JWT_ENV_LOCK: Mutex<()> = Mutex::new(());

    // Helper to run test logic with a temporarily set JWT_SECRET
    fn run_with_temp_jwt_secret<F>(secret_value: &str, test_logic: F)
    where
        F: FnOnce(),
    {
        let _guard = JWT_ENV_LOCK.lock().unwrap();

        let original_secret_val = std::env::var("JWT_SECRET").ok();
        std::env::set_var("JWT_SECRET", secret_value);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(test_logic));

        if let Some(original) = original_secret_val {
            std::env::set_var("JWT_SECRET", original);
        } else {
            std::env::remove_var("JWT_SECRET");
        }

        if let Err(panic_payload) = result {
            std::panic::resume_unwind(panic_payload);
        }
    }

    #[test]
    fn test_token_round_trip() {
        run_with_temp_jwt_secret("test_secret_for_gen_verify", || {
            let user_id = Uuid::new_v4();
            let token = generate_token(user_id, "a@b.com", UserRole::Manager).unwrap();
            let claims = verify_token(&token).unwrap();
            assert_eq!(claims.sub, user_id);
            assert_eq!(claims.email, "a@b.com");
            assert_eq!(claims.role, UserRole::Manager);
            assert!(claims.exp > claims.iat);
        });
    }

    #[test]
    fn test_expired_token_is_rejected() {
        run_with_temp_jwt_secret("test_secret_for_expiration", || {
            let past = chrono::Utc::now()
                .checked_sub_signed(chrono::Duration::hours(2))
                .expect("valid timestamp")
                .timestamp() as usize;

            let claims = Claims {
                sub: Uuid::new_v4(),
                email: "a@b.com".to_string(),
                role: UserRole::User,
                exp: past,
                iat: past,
            };
            let expired_token = encode(
                &Header::default(),
                &claims,
                &EncodingKey::from_secret("test_secret_for_expiration".as_bytes()),
            )
            .unwrap();

            match verify_token(&expired_token) {
                Err(AppError::Unauthorized(msg)) => {
                    assert!(msg.contains("ExpiredSignature"), "got: {}", msg);
                }
                Ok(_) => panic!("Token should have been invalid due to expiration"),
                Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
            }
        });
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        run_with_temp_jwt_secret("secret_one", || {
            let token = generate_token(Uuid::new_v4(), "a@b.com", UserRole::User).unwrap();
            std::env::set_var("JWT_SECRET", "secret_two");

            match verify_token(&token) {
                Err(AppError::Unauthorized(msg)) => {
                    assert!(
                        msg.contains("InvalidSignature") || msg.contains("InvalidToken"),
                        "got: {}",
                        msg
                    );
                }
                Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
                Err(e) => panic!("Unexpected error type: {:?}", e),
            }
        });
    }
}
