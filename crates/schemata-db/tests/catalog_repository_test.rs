//! Catalog repositories against a live PostgreSQL schema.
//!
//! Run with `cargo test -p schemata-db -- --ignored` and a reachable
//! `DATABASE_URL` (defaults to the local test database).

use std::sync::Arc;

use serde_json::json;

use schemata_core::{
    defaults, BaseContentType, ContentTypeRepository, EntryCountSource, Error, PageRequest,
    Principal, WorkflowRepository,
};
use schemata_db::test_fixtures::{seed_catalog, TestDatabase};
use schemata_pagination::{ContentTypePaginator, PaginationConfig};

fn reader() -> Principal {
    Principal::user("editor", "read")
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_search_by_site_filters_and_orders() {
    let test_db = TestDatabase::new().await;
    seed_catalog(&test_db).await;

    let page = test_db
        .db
        .content_types
        .search_by_site(&reader(), "", BaseContentType::Any, "name asc", 10, 0, "site-1")
        .await
        .expect("search failed");
    let names: Vec<&str> = page.iter().map(|ct| ct.name.as_str()).collect();
    assert_eq!(names, vec!["Blog", "News"]);
    assert_eq!(page[0].fields.len(), 2);

    let forms = test_db
        .db
        .content_types
        .search_by_site(&reader(), "", BaseContentType::Form, "name asc", 10, 0, "")
        .await
        .expect("search failed");
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].variable, "Contact");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_count_by_sites_ignores_blank_site() {
    let test_db = TestDatabase::new().await;
    seed_catalog(&test_db).await;
    let repo = &test_db.db.content_types;

    let all = repo
        .count_by_sites(&reader(), "", BaseContentType::Any, &[String::new()])
        .await
        .expect("count failed");
    assert_eq!(all, 4);

    let site_two = repo
        .count_by_sites(&reader(), "", BaseContentType::Any, &["site-2".to_string()])
        .await
        .expect("count failed");
    assert_eq!(site_two, 2);

    let filtered = repo
        .count_by_sites(&reader(), "bl", BaseContentType::Any, &[])
        .await
        .expect("count failed");
    assert_eq!(filtered, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_find_by_ids_matches_variable_case_insensitively() {
    let test_db = TestDatabase::new().await;
    seed_catalog(&test_db).await;

    let found = test_db
        .db
        .content_types
        .find_by_ids(
            &reader(),
            &["blog".to_string(), "missing".to_string()],
            "",
            0,
            10,
            "mod_date desc",
        )
        .await
        .expect("find failed")
        .expect("some result");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].variable, "Blog");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_unknown_order_column_is_data_access_error() {
    let test_db = TestDatabase::new().await;

    let err = test_db
        .db
        .content_types
        .search_by_site(&reader(), "", BaseContentType::Any, "title asc", 10, 0, "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DataAccess(_)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_workflow_lookups_are_batched_by_variable() {
    let test_db = TestDatabase::new().await;
    let seeded = seed_catalog(&test_db).await;

    let schemes = test_db
        .db
        .workflows
        .schemes_by_content_types(&seeded.content_types)
        .await
        .expect("scheme lookup failed");
    assert_eq!(schemes.len(), 2);
    assert_eq!(schemes["Blog"][0].name, "Editorial");

    let mappings = test_db
        .db
        .workflows
        .system_action_mappings_by_content_types(&seeded.content_types, &reader())
        .await
        .expect("mapping lookup failed");
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings["Blog"][0].identifier, seeded.mapping.identifier);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_entry_counts_require_system_principal() {
    let test_db = TestDatabase::new().await;
    seed_catalog(&test_db).await;

    let err = test_db
        .db
        .entry_counts
        .entries_by_content_type(&reader())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let counts = test_db
        .db
        .entry_counts
        .entries_by_content_type(&Principal::system())
        .await
        .expect("count lookup failed");
    assert_eq!(counts.get("blog"), Some(&3));
    assert_eq!(counts.get("banner"), Some(&2));
    assert_eq!(counts.get("contact"), None);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_paginator_over_postgres() {
    let test_db = TestDatabase::new().await;
    seed_catalog(&test_db).await;
    let db = test_db.db.clone();
    let paginator = ContentTypePaginator::new(
        Arc::new(db.content_types),
        Arc::new(db.workflows),
        Arc::new(db.entry_counts),
        PaginationConfig::default(),
    );

    let request = PageRequest::new("")
        .order_by("name")
        .with_param(defaults::SITES_PARAM, json!(["site-1", "site-2"]));
    let page = paginator
        .get_page(&reader(), &request)
        .await
        .expect("page failed");

    assert_eq!(page.variables(), vec!["Banner", "Blog", "Contact", "News"]);
    assert_eq!(page.total_results, 4);
    let blog = &page.items[1];
    assert_eq!(blog["nEntries"], json!(3));
    assert_eq!(blog["systemActionMappings"][0]["systemAction"], json!("PUBLISH"));
    assert!(!blog.contains_key("fields"));
    assert_eq!(page.items[2]["nEntries"], json!(0));

    test_db.cleanup().await;
}
