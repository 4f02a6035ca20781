//! Query strategy selection.
//!
//! Exactly one strategy is active per request, chosen once from the extra
//! parameters with the fixed precedence `types` > `sites` > default.

use tracing::debug;

use schemata_core::{
    BaseContentType, ContentType, ContentTypeRepository, Error, ExtraParams, Principal, Result,
};

/// The fetch strategy for one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStrategy {
    /// Client-known list of identifiers; the list is the whole universe.
    ExplicitIds { ids: Vec<String> },
    /// Search across several sites.
    SiteScoped { sites: Vec<String> },
    /// Search a single site; a blank id means any site.
    Default { site_id: String },
}

impl QueryStrategy {
    /// Pick the strategy for a set of extra parameters.
    pub fn resolve(extra: &ExtraParams) -> Self {
        if let Some(ids) = extra.types() {
            Self::ExplicitIds { ids }
        } else if let Some(sites) = extra.sites() {
            Self::SiteScoped { sites }
        } else {
            Self::Default {
                site_id: extra.host(),
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ExplicitIds { .. } => "explicit_ids",
            Self::SiteScoped { .. } => "site_scoped",
            Self::Default { .. } => "default",
        }
    }
}

/// Resolve a raw `type` token to a base content type.
///
/// Square brackets are stripped first, so `[FORM]` resolves like `FORM`.
pub fn resolve_base_type(token: &str) -> Result<BaseContentType> {
    let stripped = token.replace(['[', ']'], "");
    stripped.parse().map_err(Error::InvalidInput)
}

/// Window and filter shared by every strategy.
#[derive(Debug, Clone, Copy)]
pub struct PageQuery<'a> {
    pub principal: &'a Principal,
    pub filter: &'a str,
    pub base_type: BaseContentType,
    /// Normalized `"<column> <asc|desc>"` order.
    pub order: &'a str,
    pub limit: i64,
    pub offset: i64,
}

/// Records of one page plus the size of the strategy's universe.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFetch {
    pub records: Vec<ContentType>,
    pub total: i64,
}

impl QueryStrategy {
    /// Fetch the page and the total for this strategy.
    ///
    /// Repository errors propagate unchanged; wrapping is the caller's job.
    pub async fn fetch(
        &self,
        repo: &dyn ContentTypeRepository,
        query: &PageQuery<'_>,
    ) -> Result<StrategyFetch> {
        let fetched = match self {
            Self::ExplicitIds { ids } => {
                let records = repo
                    .find_by_ids(
                        query.principal,
                        ids,
                        query.filter,
                        query.offset,
                        query.limit,
                        query.order,
                    )
                    .await?
                    .unwrap_or_default();
                StrategyFetch {
                    records,
                    total: ids.len() as i64,
                }
            }
            Self::SiteScoped { sites } => {
                let records = repo
                    .search_by_sites(
                        query.principal,
                        sites,
                        query.filter,
                        query.base_type,
                        query.order,
                        query.limit,
                        query.offset,
                    )
                    .await?;
                // Total ignores the text filter: it counts every record of the
                // base type across the sites.
                let total = repo
                    .count_by_sites(query.principal, "", query.base_type, sites)
                    .await?;
                StrategyFetch { records, total }
            }
            Self::Default { site_id } => {
                let records = repo
                    .search_by_site(
                        query.principal,
                        query.filter,
                        query.base_type,
                        query.order,
                        query.limit,
                        query.offset,
                        site_id,
                    )
                    .await?;
                let total = repo
                    .count_by_sites(
                        query.principal,
                        query.filter,
                        query.base_type,
                        std::slice::from_ref(site_id),
                    )
                    .await?;
                StrategyFetch { records, total }
            }
        };

        debug!(
            subsystem = "pagination",
            component = "strategy",
            op = "fetch",
            strategy = self.name(),
            result_count = fetched.records.len(),
            total_results = fetched.total,
            "Strategy fetch complete"
        );
        Ok(fetched)
    }
}
