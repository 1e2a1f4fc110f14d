use crate::{
    auth::{generate_token, verify_password, AuthResponse, LoginRequest, RegisterRequest},
    error::AppError,
    models::CreateUserInput,
    services::users,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::SqlitePool;
use validator::Validate;

/// Register a new user
///
/// Creates a `user`-role account and returns it together with a session
/// token. A taken email is answered with 409 Conflict.
#[post("/register")]
pub async fn register(
    pool: web::Data<SqlitePool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;
    let register_data = register_data.into_inner();

    let user = users::create(
        &pool,
        CreateUserInput {
            email: register_data.email,
            first_name: register_data.first_name,
            last_name: register_data.last_name,
            password: register_data.password,
            role: None,
        },
    )
    .await?;

    let token = generate_token(user.id, &user.email, user.role)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Login user
///
/// Verifies credentials and returns the user with a fresh session token.
/// An unknown email and a wrong password are indistinguishable to the
/// caller. The active flag is deliberately not checked here; the auth
/// middleware re-checks it on every authenticated request.
#[post("/login")]
pub async fn login(
    pool: web::Data<SqlitePool>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let user = users::find_by_email(&pool, &login_data.email).await?;

    match user {
        Some(user) => {
            if verify_password(&login_data.password, &user.password_hash)? {
                let token = generate_token(user.id, &user.email, user.role)?;
                Ok(HttpResponse::Ok().json(AuthResponse {
                    token,
                    user: user.into(),
                }))
            } else {
                Err(AppError::Unauthorized("Invalid credentials".into()))
            }
        }
        None => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}
