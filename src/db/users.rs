//! Database queries for users and role membership.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::{user, user_role};
use crate::error::{AppError, AppResult};
use crate::models::Role;

/// Find a user by login email.
pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<Option<user::Model>> {
    let result = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to find user by email: {}", e)))?;

    Ok(result)
}

/// Find a user by ID.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<user::Model>> {
    let result = user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?;

    Ok(result)
}

/// Insert a new user and grant the given role, inside the caller's transaction.
pub async fn insert_with_role<C: ConnectionTrait>(
    db: &C,
    email: &str,
    first_name: &str,
    last_name: &str,
    password_hash: &str,
    role: Role,
) -> AppResult<user::Model> {
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        password_hash: Set(password_hash.to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    };

    let inserted = model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert user: {}", e)))?;

    let membership = user_role::ActiveModel {
        user_id: Set(inserted.id),
        role: Set(role.as_str().to_string()),
    };

    user_role::Entity::insert(membership)
        .exec(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to grant role: {}", e)))?;

    Ok(inserted)
}

/// All role names held by a user.
pub async fn roles_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<Vec<String>> {
    let rows = user_role::Entity::find()
        .filter(user_role::Column::UserId.eq(user_id))
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load roles: {}", e)))?;

    Ok(rows.into_iter().map(|r| r.role).collect())
}

/// Role membership check: does the user hold the given role?
pub async fn has_role<C: ConnectionTrait>(db: &C, user_id: Uuid, role: Role) -> AppResult<bool> {
    let row = user_role::Entity::find_by_id((user_id, role.as_str().to_string()))
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to check role membership: {}", e)))?;

    Ok(row.is_some())
}
