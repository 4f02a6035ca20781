//! The paginated content type query.
//!
//! One call runs a linear pipeline with no retained state:
//! normalize order, select and fetch, project, enrich, return.
//! Fetch failures abort the call; enrichment failures degrade the page.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use schemata_core::{
    ContentTypePage, ContentTypeRepository, EntryCountSource, Error, PageRequest, Principal,
    Result, WorkflowRepository,
};

use crate::cancel::run_stage;
use crate::config::PaginationConfig;
use crate::enrichment::Enricher;
use crate::order::normalize_order;
use crate::projector::project;
use crate::strategy::{resolve_base_type, PageQuery, QueryStrategy};

/// Prefix of every wrapped fetch failure.
pub const FETCH_ERROR_PREFIX: &str = "An error occurred when retrieving paginated content types";

/// Paginated, enriched content type listing.
///
/// Cheap to clone; collaborators are shared and must tolerate concurrent reads.
#[derive(Clone)]
pub struct ContentTypePaginator {
    repository: Arc<dyn ContentTypeRepository>,
    enricher: Enricher,
    config: PaginationConfig,
}

impl ContentTypePaginator {
    pub fn new(
        repository: Arc<dyn ContentTypeRepository>,
        workflows: Arc<dyn WorkflowRepository>,
        entry_counts: Arc<dyn EntryCountSource>,
        config: PaginationConfig,
    ) -> Self {
        let enricher = Enricher::new(workflows, entry_counts, config.system_principal());
        Self {
            repository,
            enricher,
            config,
        }
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Fetch one page of content types.
    ///
    /// A `limit` above the configured `max_limit` is capped, not rejected;
    /// the page's `limit` reports the window actually fetched.
    pub async fn get_page(
        &self,
        principal: &Principal,
        request: &PageRequest,
    ) -> Result<ContentTypePage> {
        self.get_page_cancellable(principal, request, &CancellationToken::new())
            .await
    }

    /// Fetch one page, aborting with `Error::Cancelled` once `cancel` fires.
    ///
    /// A cancelled call never returns a partial page. Limits are capped as
    /// in [`get_page`](Self::get_page).
    #[instrument(
        skip(self, principal, request, cancel),
        fields(
            subsystem = "pagination",
            component = "paginator",
            op = "get_page",
            principal = %principal.user_id(),
            filter = %request.filter
        )
    )]
    pub async fn get_page_cancellable(
        &self,
        principal: &Principal,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<ContentTypePage> {
        let start = Instant::now();

        let limit = self.effective_limit(request.limit)?;
        if request.offset < 0 {
            return Err(Error::InvalidInput(format!(
                "offset must not be negative, got {}",
                request.offset
            )));
        }
        let base_type = resolve_base_type(&request.extra.type_token())?;
        let order = normalize_order(request.order_by.as_deref(), request.direction);
        let strategy = QueryStrategy::resolve(&request.extra);

        debug!(
            strategy = strategy.name(),
            order = %order,
            base_type = %base_type,
            limit,
            offset = request.offset,
            "Resolved page query"
        );

        let query = PageQuery {
            principal,
            filter: &request.filter,
            base_type,
            order: &order,
            limit,
            offset: request.offset,
        };
        let fetched = run_stage(
            cancel,
            "fetch",
            strategy.fetch(&*self.repository, &query),
        )
        .await
        .map_err(wrap_fetch_error)?;

        let mut items = project(&fetched.records)?;
        self.enricher
            .enrich(&fetched.records, &mut items, principal, cancel)
            .await?;

        debug!(
            result_count = items.len(),
            total_results = fetched.total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Page assembled"
        );

        Ok(ContentTypePage {
            items,
            total_results: fetched.total,
            limit,
            offset: request.offset,
        })
    }

    /// Validate a requested page size and cap it at `max_limit`.
    fn effective_limit(&self, requested: i64) -> Result<i64> {
        if requested <= 0 {
            return Err(Error::InvalidInput(format!(
                "limit must be positive, got {}",
                requested
            )));
        }
        if requested > self.config.max_limit {
            warn!(
                requested,
                max_limit = self.config.max_limit,
                "Page limit capped"
            );
            return Ok(self.config.max_limit);
        }
        Ok(requested)
    }
}

/// Wrap a fetch failure as a data-access error.
///
/// Caller errors (security, bad input) and cancellation pass through as-is.
fn wrap_fetch_error(e: Error) -> Error {
    let cause = match e {
        Error::Forbidden(_) | Error::InvalidInput(_) | Error::Cancelled => return e,
        Error::DataAccess(message) => message,
        other => other.to_string(),
    };
    let message = format!("{}: {}", FETCH_ERROR_PREFIX, cause);
    error!(error = %message, "Content type fetch failed");
    Error::DataAccess(message)
}
