//! Behaviour every [`EventStore`] backend must share, run against each one.

use std::future::Future;

use chrono::{Duration, TimeZone, Utc};
use events::{EventFilter, EventKind, EventStore, FindLimit, KindCount, StoredEvent};
use serde_json::json;

fn at(minutes: i64) -> String {
    (Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap() + Duration::minutes(minutes)).to_rfc3339()
}

pub(crate) fn push_at(minutes: i64, author: &str) -> StoredEvent {
    serde_json::from_value(json!({
        "type": "push",
        "branch": "main",
        "message": format!("\"{author}\" pushed to \"main\" in \"repo1\""),
        "author": author,
        "repository": "repo1",
        "timestamp": at(minutes),
        "event_type": "push",
    }))
    .unwrap()
}

pub(crate) fn merge_at(minutes: i64, number: u64) -> StoredEvent {
    serde_json::from_value(json!({
        "type": "merge",
        "from_branch": "feature",
        "to_branch": "main",
        "pr_number": number,
        "action": "closed",
        "message": format!("merged #{number}"),
        "author": "bob",
        "repository": "repo1",
        "timestamp": at(minutes),
        "event_type": "pull_request",
    }))
    .unwrap()
}

fn all(limit: i64) -> EventFilter {
    EventFilter {
        kind: None,
        limit: FindLimit::new(limit),
    }
}

fn authors(events: &[StoredEvent]) -> Vec<&str> {
    events.iter().map(|e| e.record.author.as_str()).collect()
}

/// Runs every contract check, each against a fresh store from `make`.
pub(crate) async fn run_all<S, F, Fut>(make: F)
where
    S: EventStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    finds_newest_first(&make().await).await;
    breaks_timestamp_ties_by_insertion(&make().await).await;
    filters_by_exact_kind(&make().await).await;
    applies_limit_semantics(&make().await).await;
    counts_by_kind_sorted(&make().await).await;
}

async fn finds_newest_first(store: &dyn EventStore) {
    store.insert(push_at(1, "a")).await.unwrap();
    store.insert(push_at(3, "c")).await.unwrap();
    store.insert(push_at(2, "b")).await.unwrap();

    let found = store.find(all(10)).await.unwrap();

    assert_eq!(authors(&found), vec!["c", "b", "a"]);
    assert_eq!(found[0], push_at(3, "c"));
}

async fn breaks_timestamp_ties_by_insertion(store: &dyn EventStore) {
    store.insert(push_at(1, "first")).await.unwrap();
    store.insert(push_at(1, "second")).await.unwrap();

    let found = store.find(all(10)).await.unwrap();

    assert_eq!(authors(&found), vec!["second", "first"]);
}

async fn filters_by_exact_kind(store: &dyn EventStore) {
    store.insert(push_at(1, "a")).await.unwrap();
    store.insert(merge_at(2, 7)).await.unwrap();
    store.insert(push_at(3, "c")).await.unwrap();

    let pushes = store
        .find(EventFilter {
            kind: Some("push".to_string()),
            limit: FindLimit::new(10),
        })
        .await
        .unwrap();
    assert_eq!(authors(&pushes), vec!["c", "a"]);

    let merges = store
        .find(EventFilter {
            kind: Some("merge".to_string()),
            limit: FindLimit::new(10),
        })
        .await
        .unwrap();
    assert_eq!(merges, vec![merge_at(2, 7)]);

    let unknown = store
        .find(EventFilter {
            kind: Some("Push".to_string()),
            limit: FindLimit::new(10),
        })
        .await
        .unwrap();
    assert!(unknown.is_empty());
}

async fn applies_limit_semantics(store: &dyn EventStore) {
    for minute in 0..5 {
        store.insert(push_at(minute, &format!("p{minute}"))).await.unwrap();
    }

    assert_eq!(authors(&store.find(all(2)).await.unwrap()), vec!["p4", "p3"]);
    assert_eq!(store.find(all(0)).await.unwrap().len(), 5);
    assert_eq!(authors(&store.find(all(-3)).await.unwrap()), vec!["p4", "p3", "p2"]);
}

async fn counts_by_kind_sorted(store: &dyn EventStore) {
    assert!(store.count_by_kind().await.unwrap().is_empty());

    store.insert(merge_at(1, 1)).await.unwrap();
    store.insert(push_at(2, "a")).await.unwrap();
    store.insert(push_at(3, "b")).await.unwrap();

    let counts = store.count_by_kind().await.unwrap();
    assert_eq!(
        counts,
        vec![
            KindCount { kind: EventKind::Push, count: 2 },
            KindCount { kind: EventKind::Merge, count: 1 },
        ]
    );
    assert_eq!(store.count_by_kind().await.unwrap(), counts);
}
