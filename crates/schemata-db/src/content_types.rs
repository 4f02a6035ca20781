//! PostgreSQL implementation of ContentTypeRepository.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, QueryBuilder, Row};
use tracing::debug;
use uuid::Uuid;

use schemata_core::{
    defaults, BaseContentType, ContentType, ContentTypeRepository, Error, Field, Principal,
    Result,
};

use crate::escape_like;

const CONTENT_TYPE_COLUMNS: &str = r#"
    ct.id, ct.name, ct.variable, ct.description, ct.base_type, ct.host,
    ct.folder, ct.icon, ct.system, ct.fixed, ct.default_type, ct.detail_page,
    ct.url_map_pattern, ct.publish_date_var, ct.expire_date_var, ct.sort_order,
    ct.owner, ct.mod_date, ct.created, ct.metadata
"#;

/// PostgreSQL implementation of ContentTypeRepository.
pub struct PgContentTypeRepository {
    pool: Pool<Postgres>,
}

impl PgContentTypeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn ensure_visible(principal: &Principal) -> Result<()> {
        if principal.has_scope(defaults::READ_SCOPE) {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "Principal '{}' cannot read content types",
                principal.user_id()
            )))
        }
    }

    fn row_to_content_type(row: &PgRow) -> ContentType {
        let base_type: i32 = row.get("base_type");
        ContentType {
            id: row.get("id"),
            name: row.get("name"),
            variable: row.get("variable"),
            description: row.get("description"),
            // Unknown codes come from newer writers; surface them as plain content.
            base_type: BaseContentType::from_code(base_type).unwrap_or(BaseContentType::Content),
            host: row.get("host"),
            folder: row.get("folder"),
            icon: row.get("icon"),
            system: row.get("system"),
            fixed: row.get("fixed"),
            default_type: row.get("default_type"),
            detail_page: row.get("detail_page"),
            url_map_pattern: row.get("url_map_pattern"),
            publish_date_var: row.get("publish_date_var"),
            expire_date_var: row.get("expire_date_var"),
            sort_order: row.get("sort_order"),
            owner: row.get("owner"),
            mod_date: row.get("mod_date"),
            created: row.get("created"),
            metadata: row.get("metadata"),
            fields: Vec::new(),
        }
    }

    /// Load field definitions for a page of content types in one query.
    async fn attach_fields(&self, content_types: &mut [ContentType]) -> Result<()> {
        if content_types.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = content_types.iter().map(|ct| ct.id).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, content_type_id, name, variable, field_type, data_type,
                   required, indexed, listed, sort_order
            FROM field
            WHERE content_type_id = ANY($1)
            ORDER BY content_type_id, sort_order, name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut by_type: HashMap<Uuid, Vec<Field>> = HashMap::new();
        for row in rows {
            by_type
                .entry(row.get("content_type_id"))
                .or_default()
                .push(Field {
                    id: row.get("id"),
                    name: row.get("name"),
                    variable: row.get("variable"),
                    field_type: row.get("field_type"),
                    data_type: row.get("data_type"),
                    required: row.get("required"),
                    indexed: row.get("indexed"),
                    listed: row.get("listed"),
                    sort_order: row.get("sort_order"),
                });
        }

        for ct in content_types.iter_mut() {
            ct.fields = by_type.remove(&ct.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn fetch_page(&self, mut qb: QueryBuilder<'_, Postgres>) -> Result<Vec<ContentType>> {
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut content_types: Vec<ContentType> =
            rows.iter().map(Self::row_to_content_type).collect();
        self.attach_fields(&mut content_types).await?;
        Ok(content_types)
    }
}

/// Map a lower-case order column to its SQL expression.
fn sort_column(name: &str) -> Option<&'static str> {
    match name {
        "mod_date" | "moddate" => Some("ct.mod_date"),
        "name" => Some("ct.name"),
        "variable" | "velocity_var_name" => Some("ct.variable"),
        "sort_order" => Some("ct.sort_order"),
        "base_type" => Some("ct.base_type"),
        "created" => Some("ct.created"),
        "description" => Some("ct.description"),
        _ => None,
    }
}

/// Translate a normalized `"<column> <asc|desc>"` spec into an ORDER BY body.
///
/// The record id is appended as a tie-breaker so offsets page stably.
pub fn build_order_clause(order: &str) -> Result<String> {
    let spec = order.trim().to_lowercase();
    let (column, direction) = match spec.rsplit_once(' ') {
        Some((column, "asc")) => (column.trim(), "ASC"),
        Some((column, "desc")) => (column.trim(), "DESC"),
        _ => (spec.as_str(), "ASC"),
    };

    let expr = sort_column(column).ok_or_else(|| {
        Error::DataAccess(format!("Cannot order content types by '{}'", column))
    })?;
    Ok(format!("{} {}, ct.id {}", expr, direction, direction))
}

/// Append text, base type, and site restrictions to a `WHERE TRUE` query.
///
/// Blank site ids are dropped; an empty site list places no restriction.
fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    filter: &str,
    base_type: BaseContentType,
    sites: &[String],
) {
    let filter = filter.trim();
    if !filter.is_empty() {
        let pattern = format!("%{}%", escape_like(filter));
        qb.push(" AND (ct.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR ct.variable ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if !base_type.is_any() {
        qb.push(" AND ct.base_type = ").push_bind(base_type.code());
    }

    let sites: Vec<String> = sites
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if !sites.is_empty() {
        qb.push(" AND ct.host = ANY(").push_bind(sites).push(")");
    }
}

fn push_window(qb: &mut QueryBuilder<'_, Postgres>, order_clause: &str, limit: i64, offset: i64) {
    qb.push(" ORDER BY ")
        .push(order_clause)
        .push(" LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
}

fn select_base() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!(
        "SELECT {} FROM content_type ct WHERE TRUE",
        CONTENT_TYPE_COLUMNS
    ))
}

#[async_trait]
impl ContentTypeRepository for PgContentTypeRepository {
    async fn find_by_ids(
        &self,
        principal: &Principal,
        ids: &[String],
        filter: &str,
        offset: i64,
        limit: i64,
        order: &str,
    ) -> Result<Option<Vec<ContentType>>> {
        Self::ensure_visible(principal)?;
        if ids.is_empty() {
            return Ok(None);
        }
        let order_clause = build_order_clause(order)?;
        let lowered: Vec<String> = ids.iter().map(|id| id.trim().to_lowercase()).collect();

        let mut qb = select_base();
        qb.push(" AND (LOWER(ct.variable) = ANY(")
            .push_bind(lowered.clone())
            .push(") OR ct.id::TEXT = ANY(")
            .push_bind(lowered)
            .push("))");
        push_filters(&mut qb, filter, BaseContentType::Any, &[]);
        push_window(&mut qb, &order_clause, limit, offset);

        let content_types = self.fetch_page(qb).await?;
        debug!(
            subsystem = "database",
            component = "content_types",
            op = "find_by_ids",
            requested = ids.len(),
            result_count = content_types.len(),
            "Fetched content types by id"
        );
        Ok(Some(content_types))
    }

    async fn search_by_sites(
        &self,
        principal: &Principal,
        sites: &[String],
        filter: &str,
        base_type: BaseContentType,
        order: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContentType>> {
        Self::ensure_visible(principal)?;
        let order_clause = build_order_clause(order)?;

        let mut qb = select_base();
        push_filters(&mut qb, filter, base_type, sites);
        push_window(&mut qb, &order_clause, limit, offset);

        self.fetch_page(qb).await
    }

    async fn count_by_sites(
        &self,
        principal: &Principal,
        filter: &str,
        base_type: BaseContentType,
        sites: &[String],
    ) -> Result<i64> {
        Self::ensure_visible(principal)?;

        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM content_type ct WHERE TRUE");
        push_filters(&mut qb, filter, base_type, sites);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn search_by_site(
        &self,
        principal: &Principal,
        filter: &str,
        base_type: BaseContentType,
        order: &str,
        limit: i64,
        offset: i64,
        site_id: &str,
    ) -> Result<Vec<ContentType>> {
        Self::ensure_visible(principal)?;
        let order_clause = build_order_clause(order)?;

        let mut qb = select_base();
        push_filters(&mut qb, filter, base_type, &[site_id.to_string()]);
        push_window(&mut qb, &order_clause, limit, offset);

        self.fetch_page(qb).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_known_columns() {
        assert_eq!(
            build_order_clause("mod_date desc").unwrap(),
            "ct.mod_date DESC, ct.id DESC"
        );
        assert_eq!(
            build_order_clause("name asc").unwrap(),
            "ct.name ASC, ct.id ASC"
        );
        assert_eq!(
            build_order_clause("velocity_var_name desc").unwrap(),
            "ct.variable DESC, ct.id DESC"
        );
    }

    #[test]
    fn test_order_clause_without_direction_defaults_to_asc() {
        assert_eq!(
            build_order_clause("sort_order").unwrap(),
            "ct.sort_order ASC, ct.id ASC"
        );
    }

    #[test]
    fn test_order_clause_rejects_unknown_column_as_data_access() {
        let err = build_order_clause("password asc").unwrap_err();
        assert!(matches!(err, Error::DataAccess(_)));
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_order_clause_rejects_injection() {
        let err = build_order_clause("name; drop table content_type asc").unwrap_err();
        assert!(matches!(err, Error::DataAccess(_)));
    }

    #[test]
    fn test_push_filters_skips_blank_sites_and_any_type() {
        let mut qb = select_base();
        push_filters(&mut qb, "", BaseContentType::Any, &["".to_string()]);
        let sql = qb.sql().to_string();
        assert!(!sql.contains("ct.host"));
        assert!(!sql.contains("ct.base_type ="));
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn test_push_filters_applies_restrictions() {
        let mut qb = select_base();
        push_filters(
            &mut qb,
            "blog",
            BaseContentType::Form,
            &["site-1".to_string(), " ".to_string()],
        );
        let sql = qb.sql().to_string();
        assert!(sql.contains("ct.name ILIKE"));
        assert!(sql.contains("ct.base_type = "));
        assert!(sql.contains("ct.host = ANY("));
    }

    #[test]
    fn test_ensure_visible() {
        assert!(PgContentTypeRepository::ensure_visible(&Principal::user("u", "read")).is_ok());
        assert!(PgContentTypeRepository::ensure_visible(&Principal::system()).is_ok());
        let err = PgContentTypeRepository::ensure_visible(&Principal::Anonymous).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }
}
