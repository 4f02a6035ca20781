//! # schemata-pagination
//!
//! Paginated, multi-source query and enrichment for the content type catalog.
//!
//! A page request flows through a fixed pipeline:
//!
//! 1. [`normalize_order`] canonicalizes the sort expression.
//! 2. [`QueryStrategy::resolve`] picks exactly one fetch strategy
//!    (`types` > `sites` > default) and fetches the page plus its total.
//! 3. [`project`] turns each record into a map without `fields`.
//! 4. [`Enricher`] annotates each record with entry counts, workflow schemes,
//!    and system-action mappings, degrading per source on failure.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use schemata_db::Database;
//! use schemata_pagination::{ContentTypePaginator, PaginationConfig};
//! use schemata_core::{PageRequest, Principal};
//!
//! let db = Database::connect(&url).await?;
//! let paginator = ContentTypePaginator::new(
//!     Arc::new(db.content_types),
//!     Arc::new(db.workflows),
//!     Arc::new(db.entry_counts),
//!     PaginationConfig::load()?,
//! );
//!
//! let page = paginator
//!     .get_page(
//!         &Principal::user("editor", "read"),
//!         &PageRequest::new("blog").with_param("sites", serde_json::json!(["site-1"])),
//!     )
//!     .await?;
//! println!("{} of {}", page.len(), page.total_results);
//! ```

pub mod cancel;
pub mod config;
pub mod enrichment;
pub mod order;
pub mod paginator;
pub mod projector;
pub mod strategy;

// Mock collaborators for deterministic testing
pub mod mock;

pub use cancel::run_stage;
pub use config::PaginationConfig;
pub use enrichment::{Enricher, EnrichmentBundle, SourceResult};
pub use order::normalize_order;
pub use paginator::{ContentTypePaginator, FETCH_ERROR_PREFIX};
pub use projector::{project, project_one};
pub use strategy::{resolve_base_type, PageQuery, QueryStrategy, StrategyFetch};
