//! Migration: Create documents table.

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
                CREATE TABLE documents (
                    id UUID PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    file_path VARCHAR(500) NOT NULL,
                    content_type VARCHAR(255) NOT NULL,
                    file_size BIGINT NOT NULL,
                    upload_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    last_modified TIMESTAMPTZ,
                    uploaded_by_user_id UUID NOT NULL REFERENCES users(id)
                );

                CREATE INDEX idx_documents_uploaded_by ON documents(uploaded_by_user_id);
                CREATE INDEX idx_documents_upload_date ON documents(upload_date);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS documents CASCADE;")
            .await?;

        Ok(())
    }
}
