//! Migration: Create user_roles table.
//!
//! The role set is fixed; membership is one row per (user, role).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE user_roles (
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    role VARCHAR(20) NOT NULL
                        CHECK (role IN ('Admin', 'User', 'Manager')),

                    PRIMARY KEY (user_id, role)
                );

                CREATE INDEX idx_user_roles_role ON user_roles(role);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS user_roles CASCADE;")
            .await?;

        Ok(())
    }
}
