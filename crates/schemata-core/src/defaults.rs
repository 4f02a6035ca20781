//! Centralized default constants for the catalog.
//!
//! Every crate references these constants instead of defining its own
//! magic values. Organized by domain area.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size when the caller does not supply one.
pub const PAGE_LIMIT: i64 = 50;

/// Upper bound on a single page.
pub const PAGE_LIMIT_MAX: i64 = 500;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

/// Column used when no order is requested ("last modified").
pub const MOD_DATE_COLUMN: &str = "mod_date";

// =============================================================================
// EXTRA PARAMETERS
// =============================================================================

/// Explicit, ordered list of content type identifiers.
pub const TYPES_PARAM: &str = "types";

/// List of site ids to search across.
pub const SITES_PARAM: &str = "sites";

/// Base content type token.
pub const TYPE_PARAM: &str = "type";

/// Single site id for the default strategy.
pub const HOST_PARAM: &str = "host";

/// Base type token used when `type` is absent.
pub const BASE_TYPE_ANY: &str = "ANY";

// =============================================================================
// PROJECTION / ENRICHMENT KEYS
// =============================================================================

/// Key of the heavy field-definition sub-structure stripped on projection.
pub const FIELDS_KEY: &str = "fields";

/// Key of the record identifier used to join enrichment data.
pub const VARIABLE_KEY: &str = "variable";

/// Entry-count attribute added to every projected record.
pub const N_ENTRIES_KEY: &str = "nEntries";

/// Workflow-scheme attribute.
pub const WORKFLOWS_KEY: &str = "workflows";

/// System-action mapping attribute.
pub const SYSTEM_ACTION_MAPPINGS_KEY: &str = "systemActionMappings";

/// Sentinel rendered when entry counts could not be loaded.
pub const ENTRY_COUNT_UNAVAILABLE: &str = "N/A";

// =============================================================================
// IDENTITY
// =============================================================================

/// User id of the built-in system principal.
pub const SYSTEM_USER_ID: &str = "system";

/// Scope required to read content types.
pub const READ_SCOPE: &str = "read";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_limits_are_consistent() {
        assert!(PAGE_LIMIT > 0);
        assert!(PAGE_LIMIT <= PAGE_LIMIT_MAX);
        assert_eq!(PAGE_OFFSET, 0);
    }

    #[test]
    fn test_default_order_column() {
        assert_eq!(MOD_DATE_COLUMN, "mod_date");
    }
}
