//! Actix-web extractor for Bearer-token authentication.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ErrorResponse;

use super::verify_access_token;

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extractor that requires a valid Bearer access token.
///
/// Use this in handlers that require authentication:
/// ```ignore
/// async fn protected_handler(auth: AuthUser) -> impl Responder {
///     // auth.user_id identifies the authenticated caller
/// }
/// ```
///
/// Token claims only establish identity; ownership and role checks for
/// mutations are made against the database by the services.
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

impl FromRequest for AuthUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Get Config from app data for the verification secret
        let config = match req.app_data::<web::Data<Config>>() {
            Some(config) => config,
            None => {
                return ready(Err(AuthError {
                    message: "Internal configuration error".to_string(),
                }));
            }
        };

        let token = match bearer_token(req) {
            Some(token) => token,
            None => {
                return ready(Err(AuthError {
                    message: "Missing access token. Provide an Authorization: Bearer header."
                        .to_string(),
                }));
            }
        };

        let claims = match verify_access_token(&config.jwt, &token) {
            Ok(claims) => claims,
            Err(message) => return ready(Err(AuthError { message })),
        };

        let user_id = match Uuid::parse_str(&claims.sub) {
            Ok(id) => id,
            Err(_) => {
                return ready(Err(AuthError {
                    message: "Invalid subject in access token".to_string(),
                }));
            }
        };

        ready(Ok(AuthUser {
            user_id,
            email: claims.name,
            roles: claims.roles,
        }))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
