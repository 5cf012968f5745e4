//! API test suite.
//!
//! Exercises routing, bearer authentication, and validation ordering against
//! a mock database backend; no PostgreSQL instance is required.
//!
//! Run with: cargo test --test api_e2e

mod test_helpers;

mod test_auth_routes;
mod test_document_routes;
mod test_ingestion_routes;
