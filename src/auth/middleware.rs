use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::SqlitePool;
use std::rc::Rc;

use crate::auth::extractors::CurrentUser;
use crate::auth::token::verify_token;
use crate::error::AppError;
use crate::services::users;

/// Bearer-token middleware for every route under `/api`.
///
/// Verifies the session token, then resolves the subject back to an active
/// user in the directory. A deactivated or deleted account is rejected here
/// even if its token has not expired yet, so deactivation takes effect on
/// the next request.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            // Registration, login and the health probe are open.
            let path = req.path();
            if path == "/health"
                || path.starts_with("/api/auth/login")
                || path.starts_with("/api/auth/register")
            {
                return service.call(req).await;
            }

            let token = req
                .headers()
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

            let claims = verify_token(token)?;

            let pool = req
                .app_data::<web::Data<SqlitePool>>()
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalServerError("Database pool not configured".into())
                })?;

            // Session validation: the token subject must still be an active
            // account. Expiry alone is not enough, there is no revocation list.
            let user = users::find_active_by_id(&pool, claims.sub)
                .await?
                .ok_or_else(|| {
                    AppError::Unauthorized("Account is deactivated or no longer exists".into())
                })?;

            req.extensions_mut().insert(CurrentUser {
                id: user.id,
                email: user.email,
                role: user.role,
            });

            service.call(req).await
        })
    }
}
