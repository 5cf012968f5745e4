//! Migration: Create document_metadata table.
//!
//! Entries cascade with their owning document. No uniqueness constraint on
//! key within a document; duplicates are permitted.

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
                CREATE TABLE document_metadata (
                    id BIGSERIAL PRIMARY KEY,
                    document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                    key VARCHAR(255) NOT NULL,
                    value VARCHAR(1000) NOT NULL
                );

                CREATE INDEX idx_document_metadata_document_id
                    ON document_metadata(document_id);

                -- Reserved keys ("FileType", "Category") are filtered on
                CREATE INDEX idx_document_metadata_key ON document_metadata(key);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS document_metadata CASCADE;")
            .await?;

        Ok(())
    }
}
