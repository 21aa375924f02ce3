//! Tests for the in-memory search provider

use docvault_domain::ports::providers::{SearchOptions, SearchProvider};
use docvault_domain::value_objects::Document;
use docvault_providers::search::InMemorySearchProvider;
use serde_json::{Value, json};

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap_or_default()
}

async fn seeded() -> InMemorySearchProvider {
    let search = InMemorySearchProvider::new();
    search
        .index("tasks", "a", &doc(json!({"title": "Fix login bug", "tenantId": "t1"})))
        .await
        .expect("index");
    search
        .index(
            "tasks",
            "b",
            &doc(json!({"title": "Bug bash", "notes": {"body": "bug triage"}, "tenantId": "t2"})),
        )
        .await
        .expect("index");
    search
}

#[tokio::test]
async fn test_search_ranks_by_term_occurrences() {
    let search = seeded().await;
    let hits = search
        .search("tasks", "bug", &SearchOptions::default())
        .await
        .expect("search");
    let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[tokio::test]
async fn test_search_applies_equality_filters() {
    let search = seeded().await;
    let hits = search
        .search(
            "tasks",
            "bug",
            &SearchOptions::default().with_filter("tenantId", json!("t1")),
        )
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "a");
}

#[tokio::test]
async fn test_remove_drops_document_from_index() {
    let search = seeded().await;
    search.remove("tasks", "a").await.expect("remove");
    assert!(!search.is_indexed("tasks", "a"));
    assert_eq!(search.indexed_count("tasks"), 1);
}
