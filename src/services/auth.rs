//! Registration and login.
//!
//! Login is stateless: the issued token is the only session artifact, there
//! is no server-side session or refresh-token table.

use tracing::info;

use crate::auth::{self, password};
use crate::config::JwtSettings;
use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, Role};

/// Register a new user with the default role.
///
/// Fails with Conflict when the email is already taken, and with Validation
/// when the confirmation differs or the password policy rejects the
/// credential. The created record is never returned.
pub async fn register(pool: &DbPool, request: RegisterRequest) -> AppResult<()> {
    if request.email.is_empty() || !request.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    if request.password != request.confirm_password {
        return Err(AppError::Validation(
            "The password and confirmation password do not match".to_string(),
        ));
    }

    password::validate_policy(&request.password)?;

    if db::users::find_by_email(pool.connection(), &request.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&request.password)?;

    let txn = pool.begin().await?;
    let user = db::users::insert_with_role(
        &txn,
        &request.email,
        &request.first_name,
        &request.last_name,
        &password_hash,
        Role::User,
    )
    .await?;
    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit registration: {}", e)))?;

    info!("Registered user {} ({})", user.email, user.id);

    Ok(())
}

/// Verify credentials and issue an access token.
///
/// The same Unauthorized error is returned whether the email is unknown or
/// the password is wrong.
pub async fn login(pool: &DbPool, jwt: &JwtSettings, request: LoginRequest) -> AppResult<AuthResponse> {
    let user = db::users::find_by_email(pool.connection(), &request.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !password::verify_password(&user.password_hash, &request.password) {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let roles = db::users::roles_for_user(pool.connection(), user.id).await?;

    let (token, expiration) = auth::create_access_token(jwt, user.id, &user.email, &roles)?;

    info!("Issued access token for user {}", user.id);

    Ok(AuthResponse {
        token,
        expiration,
        user_id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        roles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn request(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn empty_pool() -> DbPool {
        DbPool::from_connection(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[tokio::test]
    async fn test_register_rejects_mismatched_confirmation() {
        let result = register(&empty_pool(), request("longenough1", "different1")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let result = register(&empty_pool(), request("short1", "short1")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email() {
        let mut req = request("longenough1", "longenough1");
        req.email = "not-an-email".to_string();
        let result = register(&empty_pool(), req).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_conflict_when_email_taken() {
        use crate::entity::user;

        let existing = user::Model {
            id: uuid::Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let result = register(&pool, request("longenough1", "longenough1")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_unauthorized() {
        use crate::entity::user;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let jwt = JwtSettings {
            secret: secrecy::SecretString::from("test-secret".to_string()),
            issuer: "docman".to_string(),
        };
        let result = login(
            &pool,
            &jwt,
            LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "whatever1".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        use crate::entity::user;

        let hash = password::hash_password("right password 1").unwrap();
        let existing = user::Model {
            id: uuid::Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: hash,
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let jwt = JwtSettings {
            secret: secrecy::SecretString::from("test-secret".to_string()),
            issuer: "docman".to_string(),
        };
        let result = login(
            &pool,
            &jwt,
            LoginRequest {
                email: "ada@example.com".to_string(),
                password: "wrong password 1".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_issues_token_with_held_roles() {
        use crate::entity::{user, user_role};

        let user_id = uuid::Uuid::new_v4();
        let hash = password::hash_password("right password 1").unwrap();
        let existing = user::Model {
            id: user_id,
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: hash,
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };
        let memberships = vec![
            user_role::Model {
                user_id,
                role: "User".to_string(),
            },
            user_role::Model {
                user_id,
                role: "Manager".to_string(),
            },
        ];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([memberships])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let jwt = JwtSettings {
            secret: secrecy::SecretString::from("test-secret".to_string()),
            issuer: "docman".to_string(),
        };
        let response = login(
            &pool,
            &jwt,
            LoginRequest {
                email: "ada@example.com".to_string(),
                password: "right password 1".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.user_id, user_id);
        assert_eq!(response.roles, vec!["User", "Manager"]);

        let claims = crate::auth::verify_access_token(&jwt, &response.token).unwrap();
        assert_eq!(claims.roles, vec!["User", "Manager"]);
        assert_eq!(claims.sub, user_id.to_string());
    }
}
