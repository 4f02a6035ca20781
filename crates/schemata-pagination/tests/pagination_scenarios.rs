//! End-to-end page requests against in-memory collaborators.

use std::sync::Arc;

use serde_json::json;

use schemata_core::{
    defaults, BaseContentType, ContentType, Error, PageRequest, Principal, SystemAction,
    SystemActionMapping, WorkflowScheme,
};
use schemata_pagination::mock::{
    MockContentTypeRepository, MockEntryCountSource, MockWorkflowRepository,
};
use schemata_pagination::{ContentTypePaginator, PaginationConfig};

fn reader() -> Principal {
    Principal::user("editor", "read")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn paginator_with(
    repo: MockContentTypeRepository,
    workflows: MockWorkflowRepository,
    counts: MockEntryCountSource,
) -> ContentTypePaginator {
    init_tracing();
    ContentTypePaginator::new(
        Arc::new(repo),
        Arc::new(workflows),
        Arc::new(counts),
        PaginationConfig::default(),
    )
}

fn catalog() -> Vec<ContentType> {
    vec![
        ContentType::new("Blog", "Blog", BaseContentType::Content, "site1"),
        ContentType::new("News", "News", BaseContentType::Content, "site1"),
        ContentType::new("Contact", "Contact", BaseContentType::Form, "site2"),
        ContentType::new("Banner", "Banner", BaseContentType::Widget, "site2"),
    ]
}

#[tokio::test]
async fn explicit_list_total_is_list_size() {
    let repo = MockContentTypeRepository::new().with_content_types(vec![
        ContentType::new("A", "a", BaseContentType::Content, "site1"),
        ContentType::new("Z", "z", BaseContentType::Content, "site1"),
    ]);
    let paginator = paginator_with(
        repo.clone(),
        MockWorkflowRepository::new(),
        MockEntryCountSource::new(),
    );

    let request = PageRequest::new("a").with_param(defaults::TYPES_PARAM, json!(["a", "b", "c"]));
    let page = paginator.get_page(&reader(), &request).await.unwrap();

    assert_eq!(page.variables(), vec!["a"]);
    assert_eq!(page.total_results, 3);
    assert!(!page.items[0].contains_key("fields"));
    assert_eq!(repo.count_call_count(), 0);
}

#[tokio::test]
async fn site_scoped_total_comes_from_unfiltered_count() {
    let repo = MockContentTypeRepository::new()
        .with_content_types(catalog())
        .with_count(42);
    let paginator = paginator_with(
        repo.clone(),
        MockWorkflowRepository::new(),
        MockEntryCountSource::new(),
    );

    let request = PageRequest::new("")
        .with_limit(10)
        .with_param(defaults::SITES_PARAM, json!(["site1"]));
    let page = paginator.get_page(&reader(), &request).await.unwrap();

    assert_eq!(page.total_results, 42);
    assert_eq!(page.len(), 2);
    assert!(page.has_more());
}

#[tokio::test]
async fn site_scoped_total_ignores_filter_text() {
    // Flags the asymmetry: only the site-scoped count drops the text filter.
    let repo = MockContentTypeRepository::new().with_content_types(catalog());
    let paginator = paginator_with(
        repo.clone(),
        MockWorkflowRepository::new(),
        MockEntryCountSource::new(),
    );
    let sites = json!(["site1", "site2"]);

    let unfiltered = paginator
        .get_page(
            &reader(),
            &PageRequest::new("").with_param(defaults::SITES_PARAM, sites.clone()),
        )
        .await
        .unwrap();
    let filtered = paginator
        .get_page(
            &reader(),
            &PageRequest::new("blog").with_param(defaults::SITES_PARAM, sites),
        )
        .await
        .unwrap();

    assert_eq!(unfiltered.len(), 4);
    assert_eq!(filtered.variables(), vec!["Blog"]);
    assert_eq!(unfiltered.total_results, 4);
    assert_eq!(filtered.total_results, 4);
}

#[tokio::test]
async fn default_strategy_counts_blank_site_as_single_element_list() {
    let repo = MockContentTypeRepository::new().with_content_types(catalog());
    let paginator = paginator_with(
        repo.clone(),
        MockWorkflowRepository::new(),
        MockEntryCountSource::new(),
    );

    let page = paginator
        .get_page(&reader(), &PageRequest::new("n"))
        .await
        .unwrap();

    let calls = repo.get_calls();
    let search = calls
        .iter()
        .find(|c| c.operation == "search_by_site")
        .expect("search issued");
    let count = calls
        .iter()
        .find(|c| c.operation == "count_by_sites")
        .expect("count issued");
    assert_eq!(search.sites, vec![String::new()]);
    assert_eq!(count.sites, vec![String::new()]);
    assert_eq!(count.filter, "n");
    assert_eq!(page.total_results, page.len() as i64);
}

#[tokio::test]
async fn default_strategy_uses_host() {
    let repo = MockContentTypeRepository::new().with_content_types(catalog());
    let paginator = paginator_with(
        repo.clone(),
        MockWorkflowRepository::new(),
        MockEntryCountSource::new(),
    );

    let request = PageRequest::new("").with_param(defaults::HOST_PARAM, "site2");
    let page = paginator.get_page(&reader(), &request).await.unwrap();

    assert_eq!(page.variables(), vec!["Contact", "Banner"]);
    assert_eq!(page.total_results, 2);
}

#[tokio::test]
async fn every_record_is_fully_enriched() {
    let mapping = SystemActionMapping::for_content_type("Blog", SystemAction::Publish);
    let workflows = MockWorkflowRepository::new()
        .with_schemes("Blog", vec![WorkflowScheme::new("Editorial")])
        .with_mappings("Blog", vec![mapping.clone()]);
    let counts = MockEntryCountSource::new().with_count("BLOG", 3);
    let paginator = paginator_with(
        MockContentTypeRepository::new().with_content_types(catalog()),
        workflows,
        counts.clone(),
    );

    let page = paginator
        .get_page(&reader(), &PageRequest::new(""))
        .await
        .unwrap();

    let blog = &page.items[0];
    assert_eq!(blog["nEntries"], json!(3));
    assert_eq!(blog["workflows"][0]["name"], json!("Editorial"));
    assert_eq!(blog["systemActionMappings"][0]["systemAction"], json!("PUBLISH"));
    assert_eq!(
        blog["systemActionMappings"][0]["identifier"],
        json!(mapping.identifier)
    );

    for record in &page.items[1..] {
        assert_eq!(record["nEntries"], json!(0));
        assert!(!record.contains_key("workflows"));
        assert!(!record.contains_key("systemActionMappings"));
    }
    assert_eq!(counts.principals(), vec![Principal::system()]);
}

#[tokio::test]
async fn entry_count_failure_degrades_to_sentinel() {
    let workflows = MockWorkflowRepository::new()
        .with_schemes("News", vec![WorkflowScheme::new("Editorial")])
        .with_mappings(
            "News",
            vec![SystemActionMapping::for_content_type("News", SystemAction::New)],
        );
    let paginator = paginator_with(
        MockContentTypeRepository::new().with_content_types(catalog()),
        workflows,
        MockEntryCountSource::new().with_failure(Error::State("reindex in progress".into())),
    );

    let page = paginator
        .get_page(&reader(), &PageRequest::new(""))
        .await
        .unwrap();

    assert_eq!(page.len(), 4);
    for record in &page.items {
        assert_eq!(record["nEntries"], json!("N/A"));
    }
    let news = &page.items[1];
    assert!(news.contains_key("workflows"));
    assert!(news.contains_key("systemActionMappings"));
}

#[tokio::test]
async fn workflow_failures_omit_attributes_only() {
    let workflows = MockWorkflowRepository::new()
        .with_schemes("Blog", vec![WorkflowScheme::new("Editorial")])
        .with_scheme_failure(Error::DataAccess("scheme table locked".into()))
        .with_mapping_failure(Error::Forbidden("no workflow access".into()));
    let paginator = paginator_with(
        MockContentTypeRepository::new().with_content_types(catalog()),
        workflows,
        MockEntryCountSource::new().with_count("blog", 1),
    );

    let page = paginator
        .get_page(&reader(), &PageRequest::new(""))
        .await
        .unwrap();

    assert_eq!(page.items[0]["nEntries"], json!(1));
    for record in &page.items {
        assert!(!record.contains_key("workflows"));
        assert!(!record.contains_key("systemActionMappings"));
    }
}

#[tokio::test]
async fn enrichment_preserves_fetch_order() {
    let paginator = paginator_with(
        MockContentTypeRepository::new().with_content_types(catalog()),
        MockWorkflowRepository::new(),
        MockEntryCountSource::new().with_failure(Error::State("down".into())),
    );

    let page = paginator
        .get_page(&reader(), &PageRequest::new("").with_limit(2).with_offset(1))
        .await
        .unwrap();

    assert_eq!(page.variables(), vec!["News", "Contact"]);
    assert_eq!(page.offset, 1);
    assert_eq!(page.total_results, 4);
}

#[tokio::test]
async fn fetch_failure_aborts_request() {
    let paginator = paginator_with(
        MockContentTypeRepository::new()
            .with_failure(Error::DataAccess("unsortable column: title".into())),
        MockWorkflowRepository::new(),
        MockEntryCountSource::new(),
    );

    let err = paginator
        .get_page(&reader(), &PageRequest::new("").order_by("title"))
        .await
        .unwrap_err();

    match err {
        Error::DataAccess(message) => {
            assert!(message.starts_with("An error occurred when retrieving paginated content types"));
            assert!(message.ends_with("unsortable column: title"));
        }
        other => panic!("expected data access error, got {other:?}"),
    }
}

#[tokio::test]
async fn page_serializes_with_camel_case_total() {
    let paginator = paginator_with(
        MockContentTypeRepository::new().with_content_types(catalog()),
        MockWorkflowRepository::new(),
        MockEntryCountSource::new(),
    );

    let page = paginator
        .get_page(&reader(), &PageRequest::new("").with_limit(1))
        .await
        .unwrap();
    let body = serde_json::to_value(&page).unwrap();

    assert_eq!(body["totalResults"], json!(4));
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}
