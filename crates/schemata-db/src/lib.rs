//! # schemata-db
//!
//! PostgreSQL database layer for the schemata content-type catalog.
//!
//! This crate provides:
//! - Connection pool management
//! - Content type search, count, and explicit-list lookup
//! - Batched workflow scheme and system-action mapping lookups
//! - The privileged entry-count source
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemata_db::{BaseContentType, ContentTypeRepository, Database, Principal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/schemata").await?;
//!     let reader = Principal::user("editor", "read");
//!
//!     let total = db
//!         .content_types
//!         .count_by_sites(&reader, "", BaseContentType::Any, &[])
//!         .await?;
//!
//!     println!("{} content types", total);
//!     Ok(())
//! }
//! ```
pub mod content_types;
pub mod entry_counts;
pub mod pool;
pub mod workflows;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use schemata_core::*;

pub use content_types::{build_order_clause, PgContentTypeRepository};
pub use entry_counts::PgEntryCountRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use workflows::PgWorkflowRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all catalog repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Content type search and count.
    pub content_types: PgContentTypeRepository,
    /// Workflow scheme and system-action mapping lookups.
    pub workflows: PgWorkflowRepository,
    /// Privileged per-type entry counts.
    pub entry_counts: PgEntryCountRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            content_types: PgContentTypeRepository::new(pool.clone()),
            workflows: PgWorkflowRepository::new(pool.clone()),
            entry_counts: PgEntryCountRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
