//! Migration: Create ingestion_statuses table.
//!
//! Rows are append-then-transition history; the API never deletes them.

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
                CREATE TABLE ingestion_statuses (
                    id UUID PRIMARY KEY,
                    document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                    status VARCHAR(20) NOT NULL
                        CHECK (status IN ('InProgress', 'Completed', 'Failed')),
                    triggered_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_ingestion_statuses_document_id
                    ON ingestion_statuses(document_id);
                CREATE INDEX idx_ingestion_statuses_triggered_at
                    ON ingestion_statuses(triggered_at);

                -- The stuck-row sweep scans on (status, triggered_at)
                CREATE INDEX idx_ingestion_statuses_status
                    ON ingestion_statuses(status, triggered_at);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS ingestion_statuses CASCADE;")
            .await?;

        Ok(())
    }
}
