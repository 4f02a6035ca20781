//! Property-based tests for order normalization, strategy totals, and
//! enrichment merging.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use schemata_core::{
    defaults, BaseContentType, ContentType, EntryCount, OrderDirection, PageRequest, Principal,
};
use schemata_pagination::mock::{
    MockContentTypeRepository, MockEntryCountSource, MockWorkflowRepository,
};
use schemata_pagination::{
    normalize_order, project, ContentTypePaginator, EnrichmentBundle, PaginationConfig,
    SourceResult,
};

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn column_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z_]{1,20}").unwrap()
}

fn direction_strategy() -> impl Strategy<Value = Option<OrderDirection>> {
    prop_oneof![
        Just(None),
        Just(Some(OrderDirection::Asc)),
        Just(Some(OrderDirection::Desc)),
    ]
}

fn variable_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9]{0,11}").unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// =============================================================================
// ORDER NORMALIZATION
// =============================================================================

mod order_properties {
    use super::*;

    proptest! {
        /// Output always ends in exactly one direction keyword.
        #[test]
        fn output_is_direction_qualified(
            column in column_strategy(),
            direction in direction_strategy(),
        ) {
            let order = normalize_order(Some(column.as_str()), direction);
            prop_assert!(order.ends_with(" asc") || order.ends_with(" desc"));
            prop_assert_eq!(order.clone(), order.to_lowercase());
        }

        /// Normalizing twice changes nothing.
        #[test]
        fn normalization_is_idempotent(
            column in column_strategy(),
            direction in direction_strategy(),
            other in direction_strategy(),
        ) {
            let once = normalize_order(Some(column.as_str()), direction);
            let twice = normalize_order(Some(once.as_str()), other);
            prop_assert_eq!(once, twice);
        }

        /// Blank input always means newest-modified first.
        #[test]
        fn blank_input_uses_default(
            padding in "[ \t]{0,5}",
            direction in direction_strategy(),
        ) {
            prop_assert_eq!(
                normalize_order(Some(padding.as_str()), direction),
                format!("{} desc", defaults::MOD_DATE_COLUMN)
            );
        }
    }
}

// =============================================================================
// STRATEGY TOTALS
// =============================================================================

mod total_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// With `types` set, the total is the list size whatever matches.
        #[test]
        fn explicit_list_total_is_list_size(
            ids in prop::collection::vec(variable_strategy(), 1..20),
            stored in prop::collection::vec(variable_strategy(), 0..10),
            filter in "[a-z]{0,3}",
        ) {
            let repo = MockContentTypeRepository::new().with_content_types(
                stored
                    .iter()
                    .map(|v| ContentType::new(v.clone(), v.clone(), BaseContentType::Content, "site1"))
                    .collect(),
            );
            let paginator = ContentTypePaginator::new(
                Arc::new(repo),
                Arc::new(MockWorkflowRepository::new()),
                Arc::new(MockEntryCountSource::new()),
                PaginationConfig::default(),
            );
            let request = PageRequest::new(filter)
                .with_param(defaults::TYPES_PARAM, json!(ids.clone()));

            let page = runtime()
                .block_on(paginator.get_page(&Principal::user("editor", "read"), &request))
                .unwrap();

            prop_assert_eq!(page.total_results, ids.len() as i64);
            prop_assert!(page.len() <= stored.len());
        }
    }
}

// =============================================================================
// ENRICHMENT MERGE
// =============================================================================

mod merge_properties {
    use super::*;

    proptest! {
        /// Every record gets `nEntries`, order and size are kept, and the
        /// count lookup ignores case.
        #[test]
        fn merge_is_total_and_order_preserving(
            variables in prop::collection::vec(variable_strategy(), 0..15),
            counted in prop::collection::vec(any::<bool>(), 15),
            available in any::<bool>(),
        ) {
            let types: Vec<ContentType> = variables
                .iter()
                .map(|v| ContentType::new(v.clone(), v.clone(), BaseContentType::Content, ""))
                .collect();
            let counts: HashMap<String, i64> = variables
                .iter()
                .zip(&counted)
                .filter(|(_, c)| **c)
                .map(|(v, _)| (v.to_lowercase(), 7))
                .collect();
            let bundle = EnrichmentBundle {
                entry_counts: if available {
                    SourceResult::Loaded(counts.clone())
                } else {
                    SourceResult::Unavailable
                },
                workflow_schemes: SourceResult::Unavailable,
                system_action_mappings: SourceResult::Unavailable,
            };

            let mut records = project(&types).unwrap();
            bundle.merge(&mut records);

            prop_assert_eq!(records.len(), types.len());
            for (record, ct) in records.iter().zip(&types) {
                prop_assert_eq!(&record["variable"], &json!(ct.variable));
                let expected = if !available {
                    EntryCount::Unavailable
                } else {
                    EntryCount::Count(*counts.get(&ct.variable.to_lowercase()).unwrap_or(&0))
                };
                prop_assert_eq!(&record["nEntries"], &serde_json::Value::from(expected));
                prop_assert!(!record.contains_key("fields"));
                prop_assert!(!record.contains_key("workflows"));
            }
        }
    }
}
