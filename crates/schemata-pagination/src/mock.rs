//! In-memory collaborators for deterministic testing.
//!
//! Each mock records its calls and can be told to fail. The content type
//! repository filters, windows, and counts an in-memory list the way the
//! PostgreSQL repository does, keeping insertion order.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use schemata_core::{BaseContentType, ContentType};
//! use schemata_pagination::mock::{
//!     MockContentTypeRepository, MockEntryCountSource, MockWorkflowRepository,
//! };
//! use schemata_pagination::{ContentTypePaginator, PaginationConfig};
//!
//! let repo = MockContentTypeRepository::new().with_content_types(vec![
//!     ContentType::new("Blog", "Blog", BaseContentType::Content, "site-1"),
//! ]);
//! let paginator = ContentTypePaginator::new(
//!     Arc::new(repo),
//!     Arc::new(MockWorkflowRepository::new()),
//!     Arc::new(MockEntryCountSource::new().with_count("blog", 3)),
//!     PaginationConfig::default(),
//! );
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use schemata_core::{
    defaults, BaseContentType, ContentType, ContentTypeRepository, EntryCountSource, Error,
    Principal, Result, SystemActionMapping, WorkflowRepository, WorkflowScheme,
};

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub operation: String,
    pub principal: Principal,
    pub filter: String,
    pub base_type: BaseContentType,
    pub sites: Vec<String>,
    pub ids: Vec<String>,
    pub order: String,
    pub limit: i64,
    pub offset: i64,
}

impl MockCall {
    fn new(operation: &str, principal: &Principal) -> Self {
        Self {
            operation: operation.to_string(),
            principal: principal.clone(),
            filter: String::new(),
            base_type: BaseContentType::Any,
            sites: Vec::new(),
            ids: Vec::new(),
            order: String::new(),
            limit: 0,
            offset: 0,
        }
    }
}

/// Rebuild a stored error for each failing call.
fn replay(error: &Error) -> Error {
    match error {
        Error::DataAccess(m) => Error::DataAccess(m.clone()),
        Error::Forbidden(m) => Error::Forbidden(m.clone()),
        Error::InvalidInput(m) => Error::InvalidInput(m.clone()),
        Error::State(m) => Error::State(m.clone()),
        Error::Serialization(m) => Error::Serialization(m.clone()),
        Error::Config(m) => Error::Config(m.clone()),
        Error::Cancelled => Error::Cancelled,
        Error::Internal(m) => Error::Internal(m.clone()),
        Error::Database(e) => Error::Internal(e.to_string()),
    }
}

async fn simulate_latency(latency: Option<Duration>) {
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}

fn matches_filter(ct: &ContentType, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    needle.is_empty()
        || ct.name.to_lowercase().contains(&needle)
        || ct.variable.to_lowercase().contains(&needle)
}

fn matches_base_type(ct: &ContentType, base_type: BaseContentType) -> bool {
    base_type.is_any() || ct.base_type == base_type
}

fn matches_sites(ct: &ContentType, sites: &[String]) -> bool {
    let effective: Vec<&str> = sites
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    effective.is_empty() || effective.contains(&ct.host.as_str())
}

fn window(items: Vec<ContentType>, offset: i64, limit: i64) -> Vec<ContentType> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

// =============================================================================
// CONTENT TYPE REPOSITORY
// =============================================================================

#[derive(Clone, Default)]
struct RepoConfig {
    content_types: Vec<ContentType>,
    count_override: Option<i64>,
    find_by_ids_none: bool,
    failure: Option<Arc<Error>>,
    count_failure: Option<Arc<Error>>,
    latency: Option<Duration>,
}

/// In-memory content type repository.
#[derive(Clone, Default)]
pub struct MockContentTypeRepository {
    config: Arc<RepoConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockContentTypeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn config_mut(&mut self) -> &mut RepoConfig {
        Arc::make_mut(&mut self.config)
    }

    /// Stored content types, in fetch order.
    pub fn with_content_types(mut self, content_types: Vec<ContentType>) -> Self {
        self.config_mut().content_types = content_types;
        self
    }

    /// Fixed answer for every count query.
    pub fn with_count(mut self, count: i64) -> Self {
        self.config_mut().count_override = Some(count);
        self
    }

    /// Make `find_by_ids` answer `None`.
    pub fn with_find_by_ids_none(mut self) -> Self {
        self.config_mut().find_by_ids_none = true;
        self
    }

    /// Fail every call with `error`.
    pub fn with_failure(mut self, error: Error) -> Self {
        self.config_mut().failure = Some(Arc::new(error));
        self
    }

    /// Fail only count queries with `error`.
    pub fn with_count_failure(mut self, error: Error) -> Self {
        self.config_mut().count_failure = Some(Arc::new(error));
        self
    }

    /// Delay every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.config_mut().latency = Some(latency);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    /// Number of count queries issued.
    pub fn count_call_count(&self) -> usize {
        self.calls_named("count_by_sites")
    }

    /// Number of fetch queries issued.
    pub fn fetch_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation != "count_by_sites")
            .count()
    }

    fn calls_named(&self, operation: &str) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    async fn begin(&self, call: MockCall) -> Result<()> {
        self.call_log.lock().unwrap().push(call);
        simulate_latency(self.config.latency).await;
        match &self.config.failure {
            Some(error) => Err(replay(error)),
            None => Ok(()),
        }
    }

    fn search(
        &self,
        filter: &str,
        base_type: BaseContentType,
        sites: &[String],
    ) -> Vec<ContentType> {
        self.config
            .content_types
            .iter()
            .filter(|ct| {
                matches_filter(ct, filter)
                    && matches_base_type(ct, base_type)
                    && matches_sites(ct, sites)
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ContentTypeRepository for MockContentTypeRepository {
    async fn find_by_ids(
        &self,
        principal: &Principal,
        ids: &[String],
        filter: &str,
        offset: i64,
        limit: i64,
        order: &str,
    ) -> Result<Option<Vec<ContentType>>> {
        self.begin(MockCall {
            ids: ids.to_vec(),
            filter: filter.to_string(),
            order: order.to_string(),
            limit,
            offset,
            ..MockCall::new("find_by_ids", principal)
        })
        .await?;

        if self.config.find_by_ids_none || ids.is_empty() {
            return Ok(None);
        }
        let wanted: Vec<String> = ids.iter().map(|id| id.to_lowercase()).collect();
        let found: Vec<ContentType> = self
            .config
            .content_types
            .iter()
            .filter(|ct| {
                wanted.contains(&ct.variable.to_lowercase())
                    || wanted.contains(&ct.id.to_string())
            })
            .filter(|ct| matches_filter(ct, filter))
            .cloned()
            .collect();
        Ok(Some(window(found, offset, limit)))
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
        self.begin(MockCall {
            sites: sites.to_vec(),
            filter: filter.to_string(),
            base_type,
            order: order.to_string(),
            limit,
            offset,
            ..MockCall::new("search_by_sites", principal)
        })
        .await?;

        Ok(window(self.search(filter, base_type, sites), offset, limit))
    }

    async fn count_by_sites(
        &self,
        principal: &Principal,
        filter: &str,
        base_type: BaseContentType,
        sites: &[String],
    ) -> Result<i64> {
        self.begin(MockCall {
            sites: sites.to_vec(),
            filter: filter.to_string(),
            base_type,
            ..MockCall::new("count_by_sites", principal)
        })
        .await?;

        if let Some(error) = &self.config.count_failure {
            return Err(replay(error));
        }
        Ok(self
            .config
            .count_override
            .unwrap_or_else(|| self.search(filter, base_type, sites).len() as i64))
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
        let sites = vec![site_id.to_string()];
        self.begin(MockCall {
            sites: sites.clone(),
            filter: filter.to_string(),
            base_type,
            order: order.to_string(),
            limit,
            offset,
            ..MockCall::new("search_by_site", principal)
        })
        .await?;

        Ok(window(self.search(filter, base_type, &sites), offset, limit))
    }
}

// =============================================================================
// WORKFLOW REPOSITORY
// =============================================================================

#[derive(Clone, Default)]
struct WorkflowConfig {
    schemes: HashMap<String, Vec<WorkflowScheme>>,
    mappings: HashMap<String, Vec<SystemActionMapping>>,
    scheme_failure: Option<Arc<Error>>,
    mapping_failure: Option<Arc<Error>>,
}

/// In-memory workflow lookups keyed by exact variable.
#[derive(Clone, Default)]
pub struct MockWorkflowRepository {
    config: Arc<WorkflowConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockWorkflowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn config_mut(&mut self) -> &mut WorkflowConfig {
        Arc::make_mut(&mut self.config)
    }

    pub fn with_schemes(mut self, variable: impl Into<String>, schemes: Vec<WorkflowScheme>) -> Self {
        self.config_mut().schemes.insert(variable.into(), schemes);
        self
    }

    pub fn with_mappings(
        mut self,
        variable: impl Into<String>,
        mappings: Vec<SystemActionMapping>,
    ) -> Self {
        self.config_mut().mappings.insert(variable.into(), mappings);
        self
    }

    pub fn with_scheme_failure(mut self, error: Error) -> Self {
        self.config_mut().scheme_failure = Some(Arc::new(error));
        self
    }

    pub fn with_mapping_failure(mut self, error: Error) -> Self {
        self.config_mut().mapping_failure = Some(Arc::new(error));
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    fn log_call(&self, operation: &str, principal: &Principal, content_types: &[ContentType]) {
        self.call_log.lock().unwrap().push(MockCall {
            ids: content_types.iter().map(|ct| ct.variable.clone()).collect(),
            ..MockCall::new(operation, principal)
        });
    }
}

fn select_by_variable<T: Clone>(
    source: &HashMap<String, Vec<T>>,
    content_types: &[ContentType],
) -> HashMap<String, Vec<T>> {
    content_types
        .iter()
        .filter_map(|ct| {
            source
                .get(&ct.variable)
                .map(|items| (ct.variable.clone(), items.clone()))
        })
        .collect()
}

#[async_trait]
impl WorkflowRepository for MockWorkflowRepository {
    async fn schemes_by_content_types(
        &self,
        content_types: &[ContentType],
    ) -> Result<HashMap<String, Vec<WorkflowScheme>>> {
        self.log_call(
            "schemes_by_content_types",
            &Principal::Anonymous,
            content_types,
        );
        if let Some(error) = &self.config.scheme_failure {
            return Err(replay(error));
        }
        Ok(select_by_variable(&self.config.schemes, content_types))
    }

    async fn system_action_mappings_by_content_types(
        &self,
        content_types: &[ContentType],
        principal: &Principal,
    ) -> Result<HashMap<String, Vec<SystemActionMapping>>> {
        self.log_call(
            "system_action_mappings_by_content_types",
            principal,
            content_types,
        );
        if let Some(error) = &self.config.mapping_failure {
            return Err(replay(error));
        }
        if !principal.has_scope(defaults::READ_SCOPE) {
            return Err(Error::Forbidden(format!(
                "Principal '{}' cannot read workflow action mappings",
                principal.user_id()
            )));
        }
        Ok(select_by_variable(&self.config.mappings, content_types))
    }
}

// =============================================================================
// ENTRY COUNTS
// =============================================================================

#[derive(Clone, Default)]
struct CountConfig {
    counts: HashMap<String, i64>,
    failure: Option<Arc<Error>>,
}

/// In-memory entry counts; accepts only the system principal.
#[derive(Clone, Default)]
pub struct MockEntryCountSource {
    config: Arc<CountConfig>,
    principals: Arc<Mutex<Vec<Principal>>>,
}

impl MockEntryCountSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn config_mut(&mut self) -> &mut CountConfig {
        Arc::make_mut(&mut self.config)
    }

    /// Set the count for a variable; keys are stored lower-cased.
    pub fn with_count(mut self, variable: &str, count: i64) -> Self {
        self.config_mut()
            .counts
            .insert(variable.to_lowercase(), count);
        self
    }

    pub fn with_failure(mut self, error: Error) -> Self {
        self.config_mut().failure = Some(Arc::new(error));
        self
    }

    /// Principals the source was called with, in call order.
    pub fn principals(&self) -> Vec<Principal> {
        self.principals.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.principals.lock().unwrap().len()
    }
}

#[async_trait]
impl EntryCountSource for MockEntryCountSource {
    async fn entries_by_content_type(&self, principal: &Principal) -> Result<HashMap<String, i64>> {
        self.principals.lock().unwrap().push(principal.clone());
        if let Some(error) = &self.config.failure {
            return Err(replay(error));
        }
        if !principal.is_system() {
            return Err(Error::Forbidden(format!(
                "Entry counts require the system principal, got '{}'",
                principal.user_id()
            )));
        }
        Ok(self.config.counts.clone())
    }
}
