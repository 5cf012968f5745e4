//! API endpoint modules.

pub mod auth;
pub mod documents;
pub mod health;
pub mod ingestion;
pub mod openapi;

pub use auth::configure_routes as configure_auth_routes;
pub use documents::configure_routes as configure_document_routes;
pub use health::configure_health_routes;
pub use ingestion::configure_routes as configure_ingestion_routes;
pub use openapi::ApiDoc;
