//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_users;
mod m20260801_000002_create_user_roles;
mod m20260801_000003_create_documents;
mod m20260801_000004_create_document_metadata;
mod m20260801_000005_create_ingestion_statuses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_users::Migration),
            Box::new(m20260801_000002_create_user_roles::Migration),
            Box::new(m20260801_000003_create_documents::Migration),
            Box::new(m20260801_000004_create_document_metadata::Migration),
            Box::new(m20260801_000005_create_ingestion_statuses::Migration),
        ]
    }
}
