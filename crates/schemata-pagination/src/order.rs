//! Sort expression normalization.
//!
//! Turns a raw, possibly absent sort expression plus an optional direction
//! hint into a canonical `"<column> <asc|desc>"` string. The column itself is
//! not validated here; repositories reject unsortable columns at fetch time.

use schemata_core::{defaults, OrderDirection};

const ASC_SUFFIX: &str = " asc";
const DESC_SUFFIX: &str = " desc";

/// Normalize a sort expression.
///
/// - Absent or blank `order_by` sorts by the last-modified column, newest first.
/// - An explicit ` asc`/` desc` suffix wins over `direction`.
/// - Otherwise `direction` is appended, defaulting to ascending.
pub fn normalize_order(order_by: Option<&str>, direction: Option<OrderDirection>) -> String {
    let raw = match order_by.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.to_lowercase(),
        _ => {
            return format!("{} {}", defaults::MOD_DATE_COLUMN, OrderDirection::Desc)
        }
    };

    if raw.ends_with(ASC_SUFFIX) || raw.ends_with(DESC_SUFFIX) {
        return raw;
    }

    format!("{} {}", raw, direction.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_order_defaults_to_mod_date_desc() {
        assert_eq!(normalize_order(None, None), "mod_date desc");
    }

    #[test]
    fn test_blank_order_ignores_direction_hint() {
        assert_eq!(
            normalize_order(Some("   "), Some(OrderDirection::Asc)),
            "mod_date desc"
        );
    }

    #[test]
    fn test_direction_hint_appended() {
        assert_eq!(
            normalize_order(Some("title"), Some(OrderDirection::Asc)),
            "title asc"
        );
        assert_eq!(
            normalize_order(Some("title"), Some(OrderDirection::Desc)),
            "title desc"
        );
    }

    #[test]
    fn test_missing_hint_defaults_to_asc() {
        assert_eq!(normalize_order(Some("name"), None), "name asc");
    }

    #[test]
    fn test_explicit_suffix_wins_over_hint() {
        assert_eq!(
            normalize_order(Some("title desc"), Some(OrderDirection::Asc)),
            "title desc"
        );
        assert_eq!(
            normalize_order(Some("title ASC"), Some(OrderDirection::Desc)),
            "title asc"
        );
    }

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(
            normalize_order(Some("  Sort_Order  "), Some(OrderDirection::Desc)),
            "sort_order desc"
        );
    }

    #[test]
    fn test_suffix_requires_separator() {
        // "nameasc" carries no direction suffix
        assert_eq!(normalize_order(Some("nameasc"), None), "nameasc asc");
    }
}
