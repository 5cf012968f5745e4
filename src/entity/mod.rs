//! SeaORM entity definitions for PostgreSQL database.

pub mod document;
pub mod document_metadata;
pub mod ingestion_status;
pub mod user;
pub mod user_role;
