use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::UserRole;

/// The authenticated caller, extracted from request extensions.
///
/// `AuthMiddleware` verifies the bearer token, re-checks that the account is
/// still active, and inserts this value. Handlers take it as an argument to
/// get the caller's identity and role; if it is missing the middleware did
/// not run, which is answered with `Unauthorized`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError converts into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CurrentUser>().cloned() {
            Some(current_user) => ready(Ok(current_user)),
            None => {
                let err = AppError::Unauthorized(
                    "Caller identity not found in request. Ensure AuthMiddleware is active."
                        .to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
