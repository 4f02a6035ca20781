//! Privileged entry-count lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use schemata_core::{EntryCountSource, Error, Principal, Result};

/// Counts live content items per content type.
///
/// Only the system principal may call this source: the counts span every
/// content type regardless of the end user's visibility.
pub struct PgEntryCountRepository {
    pool: Pool<Postgres>,
}

impl PgEntryCountRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryCountSource for PgEntryCountRepository {
    async fn entries_by_content_type(
        &self,
        principal: &Principal,
    ) -> Result<HashMap<String, i64>> {
        if !principal.is_system() {
            return Err(Error::Forbidden(format!(
                "Entry counts require the system principal, got '{}'",
                principal.user_id()
            )));
        }

        let rows = sqlx::query(
            r#"
            SELECT LOWER(ct.variable) AS variable, COUNT(c.id) AS entries
            FROM content_type ct
            JOIN contentlet c ON c.content_type_id = ct.id AND c.deleted = FALSE
            GROUP BY LOWER(ct.variable)
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let counts: HashMap<String, i64> = rows
            .into_iter()
            .map(|row| (row.get("variable"), row.get("entries")))
            .collect();

        debug!(
            subsystem = "database",
            component = "entry_counts",
            op = "entries_by_content_type",
            result_count = counts.len(),
            "Loaded entry counts"
        );
        Ok(counts)
    }
}
