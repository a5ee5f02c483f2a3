//! End-to-end controller scenarios with a hand-driven fetcher.
//!
//! [`ScriptedSource`] parks every request until the test resolves it, so
//! responses can be delivered in any order.

#![allow(clippy::panic)]

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::{Map, Value, json};
use tokio::sync::oneshot;
use tokio_test::{assert_err, assert_ok};

use remote_list::controller::{ControllerOptions, FetchOutcome, RemoteListController};
use remote_list::domain::{FilterPatch, ListEventKind, ListQuery, ListResult};
use remote_list::error::ListError;
use remote_list::fetch::PageFetcher;
use remote_list::service::SelectionSet;

type Reply = Result<ListResult<Value>, ListError>;

#[derive(Default)]
struct ScriptedSource {
    requests: Mutex<Vec<(ListQuery, Option<oneshot::Sender<Reply>>)>>,
}

impl ScriptedSource {
    fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn query(&self, index: usize) -> ListQuery {
        let requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        let Some((query, _)) = requests.get(index) else {
            panic!("no request #{index}");
        };
        query.clone()
    }

    fn resolve(&self, index: usize, reply: Reply) {
        let sender = {
            let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
            let Some((_, sender)) = requests.get_mut(index) else {
                panic!("no request #{index}");
            };
            sender.take()
        };
        let Some(sender) = sender else {
            panic!("request #{index} already resolved");
        };
        let _ = sender.send(reply);
    }

    async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

impl PageFetcher<Value> for ScriptedSource {
    fn fetch_page(&self, query: ListQuery) -> BoxFuture<'_, Reply> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((query, Some(tx)));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(ListError::Fetch("request dropped".into())))
        }
        .boxed()
    }
}

fn page_of(ids: &[i64], total: u64) -> Reply {
    Ok(ListResult::new(
        ids.iter()
            .map(|id| json!({ "id": id, "status": 1 }))
            .collect(),
        total,
    ))
}

fn ids(ctl: &RemoteListController<Value>) -> Vec<i64> {
    ctl.state()
        .rows()
        .iter()
        .filter_map(|row| row.get("id").and_then(Value::as_i64))
        .collect()
}

async fn loaded(
    page_size: u32,
    first: &[i64],
    total: u64,
) -> (Arc<ScriptedSource>, RemoteListController<Value>) {
    let source = Arc::new(ScriptedSource::default());
    let ctl = RemoteListController::new(
        Arc::clone(&source),
        ControllerOptions::default().with_page_size(page_size),
    );
    source.wait_for_calls(1).await;
    source.resolve(0, page_of(first, total));
    assert_ok!(ctl.last_fetch().await);
    (source, ctl)
}

#[tokio::test]
async fn late_response_never_overwrites_newer_one() {
    let (source, ctl) = loaded(2, &[1, 2], 10).await;

    let older = ctl.set_page(2);
    let newer = ctl.set_page(3);
    source.wait_for_calls(3).await;

    source.resolve(2, page_of(&[5, 6], 10));
    assert_eq!(
        newer.await,
        Ok(FetchOutcome::Committed {
            page: 3,
            rows: 2,
            total: 10
        })
    );

    source.resolve(1, page_of(&[3, 4], 10));
    assert_eq!(older.await, Ok(FetchOutcome::Superseded { error: None }));

    let state = ctl.state();
    assert_eq!(ids(&ctl), vec![5, 6]);
    assert_eq!(state.page, 3);
    assert_eq!(state.total, 10);
    assert!(!state.loading);
}

#[tokio::test]
async fn loading_stays_up_until_latest_resolves() {
    let (source, ctl) = loaded(2, &[1, 2], 10).await;

    let older = ctl.set_page(2);
    let newer = ctl.set_page(3);
    source.wait_for_calls(3).await;

    source.resolve(1, page_of(&[3, 4], 10));
    assert_eq!(older.await, Ok(FetchOutcome::Superseded { error: None }));
    assert!(ctl.state().loading);
    assert_eq!(ids(&ctl), vec![1, 2]);

    source.resolve(2, page_of(&[5, 6], 10));
    assert_ok!(newer.await);
    assert!(!ctl.state().loading);
}

#[tokio::test]
async fn stale_failure_does_not_clear_loading() {
    let (source, ctl) = loaded(2, &[1, 2], 10).await;

    let mut events = ctl.events();
    let older = ctl.set_page(2);
    let newer = ctl.search("x");
    source.wait_for_calls(3).await;

    source.resolve(1, Err(ListError::Fetch("timeout".into())));
    assert_eq!(
        older.await,
        Ok(FetchOutcome::Superseded {
            error: Some(ListError::Fetch("timeout".into()))
        })
    );
    assert!(ctl.state().loading);

    let discarded = std::iter::from_fn(|| events.try_recv().ok())
        .find_map(|event| match event.kind {
            ListEventKind::ResultDiscarded { error, .. } => Some(error),
            _ => None,
        });
    assert_eq!(discarded, Some(Some("fetch failed: timeout".to_string())));

    source.resolve(2, page_of(&[9], 1));
    assert_ok!(newer.await);
    assert_eq!(ids(&ctl), vec![9]);
}

#[tokio::test]
async fn same_page_issues_no_fetch() {
    let (source, ctl) = loaded(2, &[1, 2], 10).await;

    let pending = ctl.set_page(1);
    assert!(pending.is_skipped());
    assert_eq!(pending.await, Ok(FetchOutcome::Skipped));
    tokio::task::yield_now().await;
    assert_eq!(source.calls(), 1);

    let first = ctl.set_page(2);
    let second = ctl.set_page(2);
    assert!(!first.is_skipped());
    assert!(second.is_skipped());
}

#[tokio::test]
async fn cleared_filter_leaves_the_query() {
    let (source, ctl) = loaded(10, &[1], 1).await;

    let _ = ctl.filter_data(FilterPatch::new().set("status", 3));
    source.wait_for_calls(2).await;
    assert_eq!(source.query(1).filter("status"), Some(&json!(3)));
    source.resolve(1, page_of(&[1], 1));

    let _ = ctl.filter_data(FilterPatch::new().unset("status"));
    source.wait_for_calls(3).await;
    let query = source.query(2);
    assert!(query.filter("status").is_none());
    let wire = serde_json::to_value(&query).unwrap_or_default();
    assert!(wire.get("status").is_none());
    assert!(!wire.to_string().contains("undefined"));
}

#[tokio::test]
async fn search_and_filter_restart_from_page_one() {
    let (source, ctl) = loaded(10, &[1], 50).await;

    let _ = ctl.set_page(3);
    source.wait_for_calls(2).await;
    source.resolve(1, page_of(&[21], 50));
    assert_ok!(ctl.last_fetch().await);
    assert_eq!(ctl.state().page, 3);

    let pending = ctl.search("x");
    assert_eq!(ctl.state().page, 1);
    source.wait_for_calls(3).await;
    assert_eq!(source.query(2).page, 1);
    assert_eq!(source.query(2).keyword.as_deref(), Some("x"));
    source.resolve(2, page_of(&[1], 50));
    assert_ok!(pending.await);

    let _ = ctl.set_page(3);
    source.wait_for_calls(4).await;
    source.resolve(3, page_of(&[21], 50));
    assert_ok!(ctl.last_fetch().await);

    let _ = ctl.filter_data(FilterPatch::new().set("a", 1));
    source.wait_for_calls(5).await;
    let query = source.query(4);
    assert_eq!(query.page, 1);
    assert_eq!(query.keyword.as_deref(), Some("x"));
    assert_eq!(query.filter("a"), Some(&json!(1)));
}

#[tokio::test]
async fn optimistic_patch_stays_local() {
    let (source, ctl) = loaded(10, &[1, 2, 3], 30).await;
    let before = ctl.state();

    let mut patch = Map::new();
    patch.insert("status".into(), json!(2));
    let patched = ctl.refresh_fields(|row| row.get("id") == Some(&json!(2)), patch);
    assert_eq!(patched, 1);

    let after = ctl.state();
    assert_eq!(after.total, before.total);
    assert_eq!(after.page, before.page);
    let statuses: Vec<Value> = after
        .rows()
        .iter()
        .filter_map(|row| row.get("status").cloned())
        .collect();
    assert_eq!(statuses, vec![json!(1), json!(2), json!(1)]);

    tokio::task::yield_now().await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn subscribers_see_patches() {
    let (_source, ctl) = loaded(10, &[1, 2], 2).await;
    let mut rx = ctl.subscribe();
    rx.mark_unchanged();

    let patched = ctl.refresh_data(
        |row| row.get("id") == Some(&json!(1)),
        |row| {
            if let Some(fields) = row.as_object_mut() {
                fields.insert("status".into(), json!("processing"));
            }
        },
    );
    assert_eq!(patched, 1);
    assert!(rx.has_changed().unwrap_or(false));
}

#[tokio::test]
async fn failure_keeps_last_good_page_and_reload_recovers() {
    let (source, ctl) = loaded(2, &[1, 2], 4).await;

    let pending = ctl.set_page(2);
    source.wait_for_calls(2).await;
    source.resolve(1, Err(ListError::Fetch("502 bad gateway".into())));
    let err = assert_err!(pending.await);
    assert!(err.is_transient());

    let state = ctl.state();
    assert!(!state.loading);
    assert!(state.loaded);
    assert_eq!(state.page, 1);
    assert_eq!(state.total, 4);
    assert_eq!(ids(&ctl), vec![1, 2]);

    let retry = ctl.reload();
    source.wait_for_calls(3).await;
    assert_eq!(source.query(2).page, 2);
    source.resolve(2, page_of(&[3, 4], 4));
    assert_ok!(retry.await);
    assert_eq!(ids(&ctl), vec![3, 4]);
    assert!(!ctl.state().loading);
}

#[tokio::test]
async fn selection_check_after_failed_navigation_uses_shown_rows() {
    let (source, ctl) = loaded(2, &[1, 2], 4).await;
    let mut selection = SelectionSet::new();
    selection.select_page(ctl.state().rows());

    let pending = ctl.set_page(2);
    source.wait_for_calls(2).await;
    source.resolve(1, Err(ListError::Fetch("503".into())));
    assert_err!(pending.await);

    let state = ctl.state();
    assert_eq!(state.page, 1);
    assert!(selection.is_page_selected(state.rows()));
}

#[tokio::test]
async fn page_beyond_total_is_clamped_to_last_page() {
    let (source, ctl) = loaded(2, &[1, 2], 2).await;
    assert_eq!(ctl.state().page_count(), 1);

    let pending = ctl.set_page(2);
    assert!(pending.is_skipped());
    let state = ctl.state();
    assert_eq!(state.page, 1);
    assert_eq!(state.total, 2);
    assert_eq!(ids(&ctl), vec![1, 2]);

    let pending = ctl.set_page(0);
    assert!(pending.is_skipped());
    tokio::task::yield_now().await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn clamped_request_emits_event() {
    let (_source, ctl) = loaded(2, &[1, 2], 2).await;
    let mut events = ctl.events();
    let _ = ctl.set_page(7);
    let Ok(event) = events.try_recv() else {
        panic!("expected a clamp event");
    };
    assert_eq!(event.kind.event_type_str(), "page_clamped");
}

#[tokio::test]
async fn every_awaiter_sees_the_same_error() {
    let (source, ctl) = loaded(2, &[1, 2], 10).await;

    let pending = ctl.reload();
    let last = ctl.last_fetch();
    assert_eq!(pending.seq(), last.seq());
    source.wait_for_calls(2).await;
    source.resolve(1, Err(ListError::Fetch("reset".into())));

    assert_eq!(pending.await, Err(ListError::Fetch("reset".into())));
    assert_eq!(last.await, Err(ListError::Fetch("reset".into())));
}
