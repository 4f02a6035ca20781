//! PostgreSQL implementation of WorkflowRepository.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use schemata_core::{
    defaults, ContentType, Error, Principal, Result, SystemAction, SystemActionMapping,
    WorkflowRepository, WorkflowScheme,
};

/// PostgreSQL implementation of WorkflowRepository.
pub struct PgWorkflowRepository {
    pool: Pool<Postgres>,
}

impl PgWorkflowRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowRepository for PgWorkflowRepository {
    async fn schemes_by_content_types(
        &self,
        content_types: &[ContentType],
    ) -> Result<HashMap<String, Vec<WorkflowScheme>>> {
        if content_types.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<Uuid> = content_types.iter().map(|ct| ct.id).collect();

        let rows = sqlx::query(
            r#"
            SELECT ct.variable, ws.id, ws.name, ws.description,
                   ws.archived, ws.default_scheme, ws.mod_date
            FROM workflow_scheme_x_content_type x
            JOIN workflow_scheme ws ON ws.id = x.scheme_id
            JOIN content_type ct ON ct.id = x.content_type_id
            WHERE x.content_type_id = ANY($1)
              AND ws.archived = FALSE
            ORDER BY ct.variable, ws.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut schemes: HashMap<String, Vec<WorkflowScheme>> = HashMap::new();
        for row in rows {
            schemes
                .entry(row.get("variable"))
                .or_default()
                .push(WorkflowScheme {
                    id: row.get("id"),
                    name: row.get("name"),
                    description: row.get("description"),
                    archived: row.get("archived"),
                    default_scheme: row.get("default_scheme"),
                    mod_date: row.get("mod_date"),
                });
        }
        Ok(schemes)
    }

    async fn system_action_mappings_by_content_types(
        &self,
        content_types: &[ContentType],
        principal: &Principal,
    ) -> Result<HashMap<String, Vec<SystemActionMapping>>> {
        if !principal.has_scope(defaults::READ_SCOPE) {
            return Err(Error::Forbidden(format!(
                "Principal '{}' cannot read workflow action mappings",
                principal.user_id()
            )));
        }
        if content_types.is_empty() {
            return Ok(HashMap::new());
        }
        let variables: Vec<String> = content_types.iter().map(|ct| ct.variable.clone()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, action, workflow_action, owner, owner_content_type
            FROM workflow_action_mapping
            WHERE owner_content_type = TRUE
              AND owner = ANY($1)
            ORDER BY owner, action
            "#,
        )
        .bind(&variables)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut mappings: HashMap<String, Vec<SystemActionMapping>> = HashMap::new();
        for row in rows {
            let action: String = row.get("action");
            let system_action: SystemAction = action.parse().map_err(Error::DataAccess)?;
            let owner: String = row.get("owner");
            mappings
                .entry(owner.clone())
                .or_default()
                .push(SystemActionMapping {
                    identifier: row.get("id"),
                    system_action,
                    workflow_action_id: row.get("workflow_action"),
                    owner,
                    owner_content_type: row.get("owner_content_type"),
                });
        }
        Ok(mappings)
    }
}
