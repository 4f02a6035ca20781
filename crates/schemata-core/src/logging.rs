//! Structured logging schema and field name constants for the catalog.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same field names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed, or an enrichment source degraded the response |
//! | WARN  | Recoverable issue, request cancelled or limit capped |
//! | INFO  | Lifecycle events (pool creation, configuration load) |
//! | DEBUG | Decision points: resolved strategy, normalized order |
//! | TRACE | Per-record iteration during enrichment |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "pagination", "database"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "paginator", "strategy", "enrichment", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "get_page", "fetch", "load_entry_counts"
pub const OPERATION: &str = "op";

/// Caller principal id.
pub const PRINCIPAL: &str = "principal";

// ─── Query fields ──────────────────────────────────────────────────────────

/// Resolved query strategy ("explicit_ids", "site_scoped", "default").
pub const STRATEGY: &str = "strategy";

/// Text filter applied to the fetch.
pub const FILTER: &str = "filter";

/// Normalized order spec.
pub const ORDER: &str = "order";

/// Base content type restriction.
pub const BASE_TYPE: &str = "base_type";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records on the returned page.
pub const RESULT_COUNT: &str = "result_count";

/// Total result count reported for the page.
pub const TOTAL_RESULTS: &str = "total_results";

// ─── Enrichment fields ─────────────────────────────────────────────────────

/// Enrichment source name ("entry_counts", "workflow_schemes",
/// "system_action_mappings").
pub const SOURCE: &str = "source";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
