//! Core traits for catalog collaborators.
//!
//! The pagination layer talks to storage, workflow, and entry-count
//! subsystems only through these traits, which keeps backends pluggable and
//! the pipeline testable against in-memory doubles.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CONTENT TYPE REPOSITORY
// =============================================================================

/// Read access to stored content types.
///
/// `order` is a normalized `"<column> <asc|desc>"` spec. Implementations
/// reject columns they cannot sort on with a data-access error, and
/// principals lacking visibility with `Error::Forbidden`.
#[async_trait]
pub trait ContentTypeRepository: Send + Sync {
    /// Fetch the content types named in `ids` that match `filter`.
    ///
    /// Returns `None` when the repository has no answer for the id list.
    async fn find_by_ids(
        &self,
        principal: &Principal,
        ids: &[String],
        filter: &str,
        offset: i64,
        limit: i64,
        order: &str,
    ) -> Result<Option<Vec<ContentType>>>;

    /// Search content types across several sites.
    #[allow(clippy::too_many_arguments)]
    async fn search_by_sites(
        &self,
        principal: &Principal,
        sites: &[String],
        filter: &str,
        base_type: BaseContentType,
        order: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContentType>>;

    /// Count content types matching `filter` and `base_type` across sites.
    async fn count_by_sites(
        &self,
        principal: &Principal,
        filter: &str,
        base_type: BaseContentType,
        sites: &[String],
    ) -> Result<i64>;

    /// Search content types on a single site; a blank `site_id` means any site.
    #[allow(clippy::too_many_arguments)]
    async fn search_by_site(
        &self,
        principal: &Principal,
        filter: &str,
        base_type: BaseContentType,
        order: &str,
        limit: i64,
        offset: i64,
        site_id: &str,
    ) -> Result<Vec<ContentType>>;
}

// =============================================================================
// WORKFLOW LOOKUPS
// =============================================================================

/// Workflow scheme and system-action lookups, batched over a page of types.
///
/// Both maps are keyed by the content type's `variable`, exactly as stored.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Workflow schemes assigned to each of the given content types.
    async fn schemes_by_content_types(
        &self,
        content_types: &[ContentType],
    ) -> Result<HashMap<String, Vec<WorkflowScheme>>>;

    /// System-action mappings owned by each of the given content types.
    async fn system_action_mappings_by_content_types(
        &self,
        content_types: &[ContentType],
        principal: &Principal,
    ) -> Result<HashMap<String, Vec<SystemActionMapping>>>;
}

// =============================================================================
// ENTRY COUNTS
// =============================================================================

/// Aggregate count of content items per content type.
///
/// This is a privileged lookup: callers pass a system principal, never the
/// end user's. Keys are lower-cased variables.
#[async_trait]
pub trait EntryCountSource: Send + Sync {
    async fn entries_by_content_type(&self, principal: &Principal)
        -> Result<HashMap<String, i64>>;
}
