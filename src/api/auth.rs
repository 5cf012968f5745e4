//! Registration and login endpoints. The only routes open to anonymous
//! callers.

use actix_web::{HttpResponse, post, web};

use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{LoginRequest, MessageResponse, RegisterRequest};
use crate::services;

/// Register a new user.
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Invalid registration data", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/register")]
pub async fn register(
    pool: web::Data<DbPool>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    services::auth::register(pool.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(MessageResponse::new("User registered successfully")))
}

/// Log in and receive an access token.
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = crate::models::AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/login")]
pub async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let response = services::auth::login(pool.get_ref(), &config.jwt, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Configure auth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login);
}
