//! Read path: visibility, tenancy, pagination, group queries, population

use crate::support::{Comment, Task, harness, task};
use docvault_application::{
    AggregateOptions, GetOptions, ListGroupOptions, ListOptions, Relation, Repository,
    RepositoryOptions,
};
use docvault_domain::error::{Error, ErrorKind};
use docvault_domain::ports::TaskQueue;
use docvault_domain::ports::providers::SearchOptions;
use docvault_domain::value_objects::{Direction, FieldPath, Filter};
use docvault_providers::search::InMemorySearchProvider;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

fn repo(services: docvault_application::RepositoryServices) -> Repository<Task> {
    Repository::new(services, RepositoryOptions::default()).expect("repository")
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let h = harness();
    let err = repo(h.services).get("nope", &GetOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_tenant_isolation() {
    let h = harness();
    let base = repo(h.services);
    let acme = base.for_tenant("acme");
    let globex = base.for_tenant("globex");

    let created = acme.create(Some("t1"), &task("acme task")).await.unwrap();
    globex.create(Some("t2"), &task("globex task")).await.unwrap();

    let err = globex.get(&created.id, &GetOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { .. }));

    let page = globex.list(&ListOptions::default()).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, "t2");

    assert!(base.tenant_id().is_none());
    assert_eq!(base.list(&ListOptions::default()).await.unwrap().data.len(), 2);
}

#[tokio::test]
async fn test_soft_delete_visibility() {
    let h = harness();
    let repo = repo(h.services);
    repo.create(Some("t1"), &task("temp")).await.unwrap();

    repo.soft_delete("t1").await.unwrap();
    assert_eq!(
        repo.get("t1", &GetOptions::default()).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert!(!repo.exists("t1").await.unwrap());
    let deleted = repo
        .get("t1", &GetOptions::default().include_deleted())
        .await
        .unwrap();
    assert!(deleted.is_deleted());
    assert!(repo.list(&ListOptions::default()).await.unwrap().data.is_empty());
    assert_eq!(
        repo.list(&ListOptions::default().include_deleted())
            .await
            .unwrap()
            .data
            .len(),
        1
    );

    repo.restore("t1").await.unwrap();
    assert!(repo.exists("t1").await.unwrap());
}

#[tokio::test]
async fn test_cursor_pages_are_disjoint_and_contiguous() {
    let h = harness();
    let repo = repo(h.services);
    for i in 0..25 {
        repo.create(Some(&format!("t{i:02}")), &task(&format!("task {i}")))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut options = ListOptions::default().limit(10);
    let mut pages = 0;
    loop {
        let page = repo.list(&options).await.unwrap();
        pages += 1;
        seen.extend(page.data.iter().map(|r| r.id.clone()));
        match page.next_cursor {
            Some(cursor) => options = options.cursor(cursor),
            None => break,
        }
    }
    assert_eq!(pages, 3);
    assert_eq!(seen.len(), 25);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 25);
    // newest first
    assert_eq!(seen.first().map(String::as_str), Some("t24"));
    assert_eq!(seen.last().map(String::as_str), Some("t00"));
}

#[tokio::test]
async fn test_list_filter_and_order() {
    let h = harness();
    let repo = repo(h.services);
    for (id, priority) in [("a", 3), ("b", 1), ("c", 2)] {
        let mut t = task(id);
        t.priority = priority;
        repo.create(Some(id), &t).await.unwrap();
    }
    let page = repo
        .list(
            &ListOptions::default()
                .filter(Filter::new(
                    FieldPath::top_level("priority"),
                    docvault_domain::value_objects::FilterOp::Gte,
                    json!(2),
                ))
                .order_by(FieldPath::top_level("priority"), Direction::Asc),
        )
        .await
        .unwrap();
    let ids: Vec<_> = page.data.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["c", "a"]);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_invalid_cursor_is_rejected() {
    let h = harness();
    let err = repo(h.services)
        .list(&ListOptions::default().cursor("%%%"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_list_group_is_tenant_scoped() {
    let h = harness();
    let tasks = repo(h.services);
    for (tenant, parent) in [("acme", "p1"), ("acme", "p2"), ("globex", "p3")] {
        let scoped = tasks.for_tenant(tenant);
        scoped.create(Some(parent), &task(parent)).await.unwrap();
        let comments = scoped
            .sub_collection::<Comment>(parent, "comments", RepositoryOptions::default())
            .unwrap();
        comments
            .create(None, &Comment { body: format!("on {parent}") })
            .await
            .unwrap();
    }

    let acme_comments = tasks
        .for_tenant("acme")
        .sub_collection::<Comment>("p1", "comments", RepositoryOptions::default())
        .unwrap();
    let page = acme_comments
        .list_group(&ListGroupOptions::default())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert!(page.data.iter().all(|r| r.data.body != "on p3"));
    assert!(page.data.iter().any(|r| r.path.starts_with("tasks/p2/comments/")));
}

#[tokio::test]
async fn test_list_group_with_partition() {
    let h = harness();
    let tasks = repo(h.services);
    for parent in ["p1", "p2"] {
        tasks.for_tenant(parent).create(Some(parent), &task(parent)).await.unwrap();
        tasks
            .for_tenant(parent)
            .sub_collection::<Comment>(parent, "comments", RepositoryOptions::default())
            .unwrap()
            .create(None, &Comment { body: parent.to_string() })
            .await
            .unwrap();
    }
    let comments = tasks
        .sub_collection::<Comment>("p1", "comments", RepositoryOptions::default())
        .unwrap();
    let page = comments
        .list_group(
            &ListGroupOptions::default().partition(Filter::eq("tenantId", json!("p2"))),
        )
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].data.body, "p2");
}

#[tokio::test]
async fn test_aggregate_counts_visible_records() {
    let h = harness();
    let repo = repo(h.services);
    for (id, priority) in [("a", 2), ("b", 4), ("c", 6)] {
        let mut t = task(id);
        t.priority = priority;
        repo.create(Some(id), &t).await.unwrap();
    }
    repo.soft_delete("c").await.unwrap();

    let result = repo
        .aggregate(
            &AggregateOptions::new()
                .sum(FieldPath::top_level("priority"))
                .average(FieldPath::top_level("priority")),
        )
        .await
        .unwrap();
    assert_eq!(result["count"], 2.0);
    assert_eq!(result["sum_priority"], 6.0);
    assert_eq!(result["avg_priority"], 3.0);
}

#[tokio::test]
async fn test_populate_and_mask() {
    let h = harness();
    let users: Repository<Comment> = Repository::new(h.services.clone(), RepositoryOptions::default()).unwrap();
    users.create(Some("u1"), &Comment { body: "owner".into() }).await.unwrap();

    let tasks: Repository<Task> = Repository::new(
        h.services,
        RepositoryOptions::default()
            .with_relation("owner", Relation::new(FieldPath::top_level("owner"), "comments")),
    )
    .unwrap();
    let mut t = task("secret title");
    t.owner = Some("u1".into());
    tasks.create(Some("t1"), &t).await.unwrap();

    let record = tasks
        .get(
            "t1",
            &GetOptions::default()
                .populate("owner")
                .mask(FieldPath::top_level("title")),
        )
        .await
        .unwrap();
    assert_eq!(record.data.title, "***");
    assert_eq!(record.populated["owner"]["body"], json!("owner"));
    assert_eq!(record.populated["owner"]["id"], json!("u1"));

    let err = tasks
        .get("t1", &GetOptions::default().populate("missing"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_populate_decodes_only_own_collection() {
    let h = harness();
    let comments: Repository<Comment> = Repository::new(
        h.services.clone(),
        RepositoryOptions::default().encrypt_field(FieldPath::top_level("body")),
    )
    .unwrap();
    comments.create(Some("c1"), &Comment { body: "hidden".into() }).await.unwrap();

    let tasks: Repository<Task> = Repository::new(
        h.services,
        RepositoryOptions::default()
            .encrypt_field(FieldPath::top_level("ssn"))
            .with_relation("parent", Relation::new(FieldPath::top_level("owner"), "tasks"))
            .with_relation("comment", Relation::new(FieldPath::top_level("notes"), "comments")),
    )
    .unwrap();
    let mut parent = task("parent");
    parent.ssn = Some("123-45-6789".into());
    tasks.create(Some("p1"), &parent).await.unwrap();
    let mut child = task("child");
    child.owner = Some("p1".into());
    child.notes = Some("c1".into());
    tasks.create(Some("t1"), &child).await.unwrap();

    let record = tasks
        .get("t1", &GetOptions::default().populate("parent").populate("comment"))
        .await
        .unwrap();
    assert_eq!(record.populated["parent"]["ssn"], json!("123-45-6789"));
    assert_eq!(record.populated["parent"]["id"], json!("p1"));
    // foreign collections stay in stored form
    assert_ne!(record.populated["comment"]["body"], json!("hidden"));
    assert_eq!(record.populated["comment"]["id"], json!("c1"));
}

#[tokio::test]
async fn test_search_drops_soft_deleted_hits() {
    let h = harness();
    let search = Arc::new(InMemorySearchProvider::new());
    let repo = repo(h.services.clone().with_search(search.clone()));
    repo.create(Some("a"), &task("alpha release")).await.unwrap();
    repo.create(Some("b"), &task("alpha draft")).await.unwrap();
    h.tasks.flush().await.unwrap();
    assert_eq!(search.indexed_count("tasks"), 2);

    repo.soft_delete("b").await.unwrap();
    let hits = repo.search("alpha", &SearchOptions::default()).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "a");
}

#[tokio::test]
async fn test_search_without_provider_fails() {
    let h = harness();
    let err = repo(h.services)
        .search("x", &SearchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
}
