//! Race-safe paginated list controller.
//!
//! [`RemoteListController`] sits between a presentation layer and a remote
//! paginated source. It owns the current page, keyword and extra filters,
//! issues fetches through a [`PageFetcher`], and commits results into a
//! [`tokio::sync::watch`] channel the view renders from.
//!
//! # Sequencing
//!
//! Every fetch is tagged with a monotonically increasing sequence number
//! when it is issued. A result is committed only if its number is still
//! the latest one; anything older is dropped silently. Results are
//! therefore applied in issue order of the winning request, never in
//! resolution order. In-flight network calls are not aborted, only their
//! effect on state is suppressed.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, watch};

use super::options::ControllerOptions;
use super::pending::{FetchOutcome, PendingFetch};
use super::state::ControllerState;
use crate::domain::{
    ControllerId, EventBus, FetchReason, FilterPatch, Filters, ListEvent, ListEventKind, ListQuery,
    ListResult, clamp_page, merge_shallow, page_count,
};
use crate::error::ListError;
use crate::fetch::PageFetcher;

/// Paginated remote-list state controller.
///
/// One controller is created per list view and bound to one fetcher and
/// one page size. Intents (`set_page`, `search`, `filter_data`, `reload`)
/// return immediately with a [`PendingFetch`]; the fetch itself runs on
/// the tokio runtime, so the controller must be created and driven from
/// within one.
///
/// Dropping the controller tears it down: fetches still in flight resolve
/// to [`FetchOutcome::Detached`] and never write state.
pub struct RemoteListController<R> {
    core: Arc<Core<R>>,
}

struct Core<R> {
    id: ControllerId,
    options: ControllerOptions,
    fetcher: Arc<dyn PageFetcher<R>>,
    book: Mutex<Book>,
    state: watch::Sender<ControllerState<R>>,
    events: EventBus,
}

/// Query bookkeeping; every state write happens while this is locked.
struct Book {
    page: u32,
    committed_page: u32,
    keyword: Option<String>,
    extra: Filters,
    initialized: bool,
    latest_seq: u64,
    last_issued: Option<ListQuery>,
    last_fetch: Option<PendingFetch>,
}

impl Book {
    fn query(&self, page_size: u32) -> ListQuery {
        ListQuery {
            page: self.page,
            page_size,
            keyword: self.keyword.clone(),
            extra: self.extra.clone(),
        }
    }
}

#[derive(Clone, Copy)]
struct Issued {
    seq: u64,
    silent: bool,
}

enum Settled {
    Done(Result<FetchOutcome, ListError>),
    Follow(PendingFetch),
}

impl<R> fmt::Debug for RemoteListController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteListController")
            .field("id", &self.core.id)
            .field("options", &self.core.options)
            .finish_non_exhaustive()
    }
}

impl<R> RemoteListController<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Creates a controller over `fetcher`.
    ///
    /// Unless [`ControllerOptions::un_init_data`] is set, the first page
    /// (or [`ControllerOptions::initial_page`]) is requested immediately;
    /// await [`Self::last_fetch`] to wait for it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime and a fetch is issued.
    #[must_use]
    pub fn new<F>(fetcher: F, options: ControllerOptions) -> Self
    where
        F: PageFetcher<R>,
    {
        let page_size = options.page_size.max(1);
        let page = options.initial_page.max(1);
        let (state, _) = watch::channel(ControllerState::new(page, page_size));
        let options = ControllerOptions {
            page_size,
            initial_page: page,
            ..options
        };

        let id = ControllerId::new();
        let core = Arc::new(Core {
            id,
            events: EventBus::new(id, options.event_bus_capacity),
            fetcher: Arc::new(fetcher),
            book: Mutex::new(Book {
                page,
                committed_page: page,
                keyword: None,
                extra: Filters::new(),
                initialized: !options.un_init_data,
                latest_seq: 0,
                last_issued: None,
                last_fetch: None,
            }),
            state,
            options,
        });

        tracing::debug!(controller_id = %core.id, page_size, page, "list controller created");

        {
            let mut book = core.lock_book();
            if book.initialized {
                core.issue(&mut book, FetchReason::Initial, false);
            }
        }

        Self { core }
    }

    /// Returns this controller's identifier.
    #[must_use]
    pub fn id(&self) -> ControllerId {
        self.core.id
    }

    /// Returns the options the controller was built with.
    #[must_use]
    pub fn options(&self) -> &ControllerOptions {
        &self.core.options
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ControllerState<R> {
        self.core.state.borrow().clone()
    }

    /// Subscribes to state changes.
    ///
    /// Do not hold a borrow of the receiver across an `.await`; commits
    /// wait for outstanding borrows.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControllerState<R>> {
        self.core.state.subscribe()
    }

    /// Subscribes to lifecycle events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<ListEvent> {
        self.core.events.subscribe()
    }

    /// Returns the query the next `reload()` would send.
    #[must_use]
    pub fn query(&self) -> ListQuery {
        self.core.lock_book().query(self.core.options.page_size)
    }

    /// Returns the handle of the most recently issued fetch.
    ///
    /// Resolves to [`FetchOutcome::Skipped`] if nothing has been issued
    /// since construction or the last `clean()`.
    #[must_use]
    pub fn last_fetch(&self) -> PendingFetch {
        self.core
            .lock_book()
            .last_fetch
            .clone()
            .unwrap_or_else(PendingFetch::skipped)
    }

    /// Moves to `page`, clamped into `[1, page_count]` for the current total.
    ///
    /// Issues no fetch if the resulting query equals the last issued one.
    pub fn set_page(&self, page: u32) -> PendingFetch {
        let core = &self.core;
        let mut book = core.lock_book();
        let total = core.state.borrow().total;
        let target = clamp_page(page, total, core.options.page_size);
        if target != page {
            tracing::debug!(controller_id = %core.id, requested = page, page = target, "page clamped");
            core.events.emit(ListEventKind::PageClamped {
                requested: page,
                page: target,
            });
        }
        book.page = target;
        core.dispatch(&mut book, FetchReason::Navigate)
    }

    /// Searches for `keyword` from page 1.
    ///
    /// A blank keyword clears the search.
    pub fn search(&self, keyword: impl Into<String>) -> PendingFetch {
        let keyword = keyword.into();
        let core = &self.core;
        let mut book = core.lock_book();
        book.keyword = (!keyword.trim().is_empty()).then_some(keyword);
        book.page = 1;
        book.initialized = true;
        core.dispatch(&mut book, FetchReason::Search)
    }

    /// Merges `patch` into the extra filters and reloads from page 1.
    ///
    /// Keys unset in the patch are removed from every later query.
    pub fn filter_data(&self, patch: FilterPatch) -> PendingFetch {
        let core = &self.core;
        let mut book = core.lock_book();
        patch.apply_to(&mut book.extra);
        book.page = 1;
        book.initialized = true;
        core.dispatch(&mut book, FetchReason::Filter)
    }

    /// Re-issues the current query without touching page, keyword or
    /// filters.
    ///
    /// Cheap enough to call from a polling loop. With
    /// [`ControllerOptions::cancel_loading_when_reload`] set, `loading`
    /// is left alone, including for any clamp re-fetch the reload causes.
    pub fn reload(&self) -> PendingFetch {
        let core = &self.core;
        let mut book = core.lock_book();
        if !book.initialized {
            return PendingFetch::skipped();
        }
        let silent = core.options.cancel_loading_when_reload;
        core.issue(&mut book, FetchReason::Reload, silent)
    }

    /// Patches every current row matching `predicate`, locally.
    ///
    /// Produces a new row vector, so subscribers observe the change.
    /// `total` and `page` are untouched and no fetch is issued. Returns
    /// the number of rows patched.
    pub fn refresh_data<P, F>(&self, predicate: P, mut patch: F) -> usize
    where
        P: Fn(&R) -> bool,
        F: FnMut(&mut R),
    {
        let core = &self.core;
        let mut patched = 0_usize;
        core.state.send_if_modified(|state| {
            if !state.data.iter().any(&predicate) {
                return false;
            }
            let rows = state
                .data
                .iter()
                .map(|row| {
                    let mut row = row.clone();
                    if predicate(&row) {
                        patch(&mut row);
                        patched = patched.saturating_add(1);
                    }
                    row
                })
                .collect();
            state.data = Arc::new(rows);
            true
        });

        if patched > 0 {
            tracing::debug!(controller_id = %core.id, rows = patched, "rows patched locally");
            core.events.emit(ListEventKind::RowsPatched { rows: patched });
        }
        patched
    }

    /// Resets to an empty, unloaded page 1 and invalidates in-flight fetches.
    ///
    /// Keyword and filters are kept; the next intent fetches again even if
    /// its query matches the one issued before the reset.
    pub fn clean(&self) {
        let core = &self.core;
        let mut book = core.lock_book();
        book.latest_seq = book.latest_seq.saturating_add(1);
        book.last_issued = None;
        book.last_fetch = None;
        book.page = 1;
        book.committed_page = 1;
        core.state.send_modify(|state| {
            state.page = 1;
            state.total = 0;
            state.data = Arc::new(Vec::new());
            state.loading = false;
            state.loaded = false;
            state.loaded_at = None;
        });
        tracing::debug!(controller_id = %core.id, "list cleaned");
        core.events.emit(ListEventKind::Cleaned);
    }
}

impl RemoteListController<Value> {
    /// Shallow-merges `patch` into every current JSON row matching
    /// `predicate`. See [`Self::refresh_data`].
    pub fn refresh_fields<P>(&self, predicate: P, patch: Map<String, Value>) -> usize
    where
        P: Fn(&Value) -> bool,
    {
        self.refresh_data(predicate, |row| merge_shallow(row, &patch))
    }
}

impl<R> Core<R>
where
    R: Clone + Send + Sync + 'static,
{
    fn lock_book(&self) -> MutexGuard<'_, Book> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a fetch unless the query is unchanged or the controller is
    /// still waiting for its prerequisite.
    fn dispatch(self: &Arc<Self>, book: &mut Book, reason: FetchReason) -> PendingFetch {
        if !book.initialized {
            let page = book.page;
            book.committed_page = page;
            self.state.send_if_modified(|state| {
                let changed = state.page != page;
                state.page = page;
                changed
            });
            return PendingFetch::skipped();
        }

        let query = book.query(self.options.page_size);
        if book.last_issued.as_ref() == Some(&query) {
            tracing::trace!(controller_id = %self.id, page = query.page, "query unchanged, no fetch");
            return PendingFetch::skipped();
        }
        self.issue(book, reason, false)
    }

    /// Tags and spawns a fetch for the current query. A `silent` fetch
    /// leaves `loading` untouched.
    fn issue(self: &Arc<Self>, book: &mut Book, reason: FetchReason, silent: bool) -> PendingFetch {
        book.latest_seq = book.latest_seq.saturating_add(1);
        let seq = book.latest_seq;
        let query = book.query(self.options.page_size);
        book.last_issued = Some(query.clone());

        let page = query.page;
        self.state.send_modify(|state| {
            state.page = page;
            if !silent {
                state.loading = true;
            }
        });

        tracing::debug!(controller_id = %self.id, seq, page, ?reason, silent, "issuing page fetch");
        self.events.emit(ListEventKind::FetchIssued {
            seq,
            page,
            reason,
            silent,
        });

        let task = tokio::spawn(run_fetch(
            Arc::downgrade(self),
            Arc::clone(&self.fetcher),
            Issued { seq, silent },
            query,
        ));
        let shared = async move {
            task.await
                .unwrap_or_else(|err| Err(ListError::Internal(format!("fetch task failed: {err}"))))
        }
        .boxed()
        .shared();

        let pending = PendingFetch::issued(seq, shared);
        book.last_fetch = Some(pending.clone());
        pending
    }

    /// Applies a resolved fetch if it is still the latest one.
    fn settle(
        self: &Arc<Self>,
        issued: Issued,
        query: &ListQuery,
        result: Result<ListResult<R>, ListError>,
    ) -> Settled {
        let Issued { seq, silent } = issued;
        let mut book = self.lock_book();
        if seq != book.latest_seq {
            let error = result.err();
            tracing::debug!(
                controller_id = %self.id,
                seq,
                latest = book.latest_seq,
                rejected = error.is_some(),
                "discarding superseded page result"
            );
            self.events.emit(ListEventKind::ResultDiscarded {
                seq,
                error: error.as_ref().map(ToString::to_string),
            });
            return Settled::Done(Ok(FetchOutcome::Superseded { error }));
        }

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                // Rows still belong to the last committed page; the request
                // stays in `book` so reload() retries it.
                let committed_page = book.committed_page;
                book.last_issued = None;
                self.state.send_modify(|state| {
                    state.page = committed_page;
                    state.loading = false;
                });
                tracing::warn!(controller_id = %self.id, seq, error = %err, "page fetch failed");
                self.events.emit(ListEventKind::FetchFailed {
                    seq,
                    code: err.error_code(),
                    message: err.to_string(),
                });
                return Settled::Done(Err(err));
            }
        };

        let last_page = page_count(page.total, self.options.page_size);
        let mut committed_page = query.page;
        if query.page > last_page {
            tracing::debug!(
                controller_id = %self.id,
                requested = query.page,
                page = last_page,
                total = page.total,
                "committed total puts page out of range"
            );
            self.events.emit(ListEventKind::PageClamped {
                requested: query.page,
                page: last_page,
            });
            book.page = last_page;
            if page.total > 0 {
                let total = page.total;
                self.state.send_modify(|state| state.total = total);
                return Settled::Follow(self.issue(&mut book, FetchReason::Clamp, silent));
            }
            committed_page = last_page;
            book.last_issued = Some(book.query(self.options.page_size));
        }

        book.committed_page = committed_page;
        let rows = page.data.len();
        let total = page.total;
        let data = Arc::new(page.data);
        self.state.send_modify(|state| {
            state.page = committed_page;
            state.total = total;
            state.data = data;
            state.loading = false;
            state.loaded = true;
            state.loaded_at = Some(Utc::now());
        });

        tracing::debug!(controller_id = %self.id, seq, page = committed_page, rows, total, "page committed");
        self.events.emit(ListEventKind::PageCommitted {
            seq,
            page: committed_page,
            rows,
            total,
        });

        Settled::Done(Ok(FetchOutcome::Committed {
            page: committed_page,
            rows,
            total,
        }))
    }
}

/// Runs one fetch and settles it against the controller, if still alive.
///
/// A fetcher that panics, while building its future or while it is
/// polled, is treated exactly like one that rejects.
fn run_fetch<R>(
    core: Weak<Core<R>>,
    fetcher: Arc<dyn PageFetcher<R>>,
    issued: Issued,
    query: ListQuery,
) -> BoxFuture<'static, Result<FetchOutcome, ListError>>
where
    R: Clone + Send + Sync + 'static,
{
    async move {
        let result = AssertUnwindSafe(async { fetcher.fetch_page(query.clone()).await })
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ListError::FetcherPanicked(panic_message(&*payload))));

        let Some(core) = core.upgrade() else {
            tracing::debug!(seq = issued.seq, "controller dropped before fetch resolved");
            return Ok(FetchOutcome::Detached);
        };

        match core.settle(issued, &query, result) {
            Settled::Done(outcome) => outcome,
            Settled::Follow(next) => {
                drop(core);
                next.await
            }
        }
    }
    .boxed()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
