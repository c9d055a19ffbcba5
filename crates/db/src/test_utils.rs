//! Test utilities for database operations.
//!
//! Provides a migrated database for service and router tests. By default the
//! database is an in-memory `SQLite` instance; set `TEST_DATABASE_URL` to run
//! against a real `PostgreSQL` server instead.

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{Report, ReportVote};
use crate::migrations::Migrator;

/// In-memory `SQLite` URL. Every connection gets its own database.
pub const SQLITE_MEMORY_URL: &str = "sqlite::memory:";

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh, migrated database.
    ///
    /// Uses `TEST_DATABASE_URL` when set, otherwise in-memory `SQLite`.
    pub async fn new() -> Result<Self, DbErr> {
        let url =
            std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| SQLITE_MEMORY_URL.to_string());
        Self::with_url(&url).await
    }

    /// Create a migrated database at `url`.
    pub async fn with_url(url: &str) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(url);
        // A single connection keeps an in-memory database alive and shared.
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!(url = %url, "Connected to migrated test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Shared handle to the connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Remove all rows from every table.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        ReportVote::delete_many().exec(self.conn.as_ref()).await?;
        Report::delete_many().exec(self.conn.as_ref()).await?;
        info!("Cleaned up test database");
        Ok(())
    }
}
