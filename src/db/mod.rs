//! Database module providing connection management, migrations, and typed
//! query functions per entity.
//!
//! Query functions are generic over [`sea_orm::ConnectionTrait`] so they run
//! against the pooled connection or inside a [`DatabaseTransaction`]. The
//! transaction is the durability boundary: multi-write operations begin one,
//! commit on success, and roll back when dropped on an error path.

pub mod documents;
pub mod ingestion_statuses;
pub mod users;

use sea_orm::{Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Database connection wrapper shared across handlers.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to the database from configuration.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let conn = Database::connect(&config.database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Wrap an existing connection (used by tests with a mock backend).
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        DbPool { conn }
    }

    /// Get the underlying connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Begin a transaction. Commits explicitly; rolls back when dropped.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.conn
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))
    }

    /// Apply pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))
    }
}
