//! In-memory page source.
//!
//! [`MemorySource`] serves pages out of a row vector guarded by a
//! [`tokio::sync::RwLock`]. It stands in for a REST list endpoint in the
//! demo console and in tests: rows can be inserted, updated and removed
//! while controllers are reading, and failures or latency can be injected.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::sync::RwLock;

use super::PageFetcher;
use crate::domain::{ListQuery, ListResult};
use crate::error::ListError;

type Matcher<R> = Arc<dyn Fn(&R, &ListQuery) -> bool + Send + Sync>;

/// Row store answering [`ListQuery`]s like a paginated list endpoint.
pub struct MemorySource<R> {
    rows: RwLock<Vec<R>>,
    matcher: Matcher<R>,
    latency: Option<Duration>,
    calls: AtomicUsize,
    failures_pending: AtomicUsize,
}

impl<R> fmt::Debug for MemorySource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("latency", &self.latency)
            .field("calls", &self.calls.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<R: Clone + Send + Sync + 'static> MemorySource<R> {
    /// Creates a source over `rows`, filtered by `matcher`.
    ///
    /// `matcher` decides whether a row satisfies the query's keyword and
    /// extra filters; pagination is applied afterwards.
    #[must_use]
    pub fn new<M>(rows: Vec<R>, matcher: M) -> Self
    where
        M: Fn(&R, &ListQuery) -> bool + Send + Sync + 'static,
    {
        Self {
            rows: RwLock::new(rows),
            matcher: Arc::new(matcher),
            latency: None,
            calls: AtomicUsize::new(0),
            failures_pending: AtomicUsize::new(0),
        }
    }

    /// Delays every page by `latency` before answering.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next `n` fetches fail with [`ListError::Fetch`].
    pub fn fail_next(&self, n: usize) {
        self.failures_pending.store(n, Ordering::SeqCst);
    }

    /// Number of fetches served so far (including failed ones).
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Appends a row.
    pub async fn insert(&self, row: R) {
        self.rows.write().await.push(row);
    }

    /// Applies `patch` to every stored row matching `predicate`.
    ///
    /// Returns the number of rows updated.
    pub async fn update<P, F>(&self, predicate: P, mut patch: F) -> usize
    where
        P: Fn(&R) -> bool,
        F: FnMut(&mut R),
    {
        let mut rows = self.rows.write().await;
        let mut updated = 0_usize;
        for row in rows.iter_mut().filter(|row| predicate(row)) {
            patch(row);
            updated = updated.saturating_add(1);
        }
        updated
    }

    /// Removes every stored row matching `predicate`.
    ///
    /// Returns the number of rows removed.
    pub async fn remove<P>(&self, predicate: P) -> usize
    where
        P: Fn(&R) -> bool,
    {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| !predicate(row));
        before.saturating_sub(rows.len())
    }

    /// Returns the number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns `true` if the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Answers `query` from the current rows.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Fetch`] while injected failures are pending.
    pub async fn page(&self, query: &ListQuery) -> Result<ListResult<R>, ListError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ListError::Fetch("injected failure".to_string()));
        }

        let rows = self.rows.read().await;
        let matching: Vec<&R> = rows
            .iter()
            .filter(|row| (self.matcher)(row, query))
            .collect();

        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let data = matching
            .into_iter()
            .skip(offset)
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(ListResult::new(data, total))
    }
}

impl MemorySource<Value> {
    /// Creates a source of JSON rows using [`json_matcher`].
    #[must_use]
    pub fn json(rows: Vec<Value>) -> Self {
        Self::new(rows, json_matcher)
    }
}

impl<R: Clone + Send + Sync + 'static> PageFetcher<R> for MemorySource<R> {
    fn fetch_page(&self, query: ListQuery) -> BoxFuture<'_, Result<ListResult<R>, ListError>> {
        async move { self.page(&query).await }.boxed()
    }
}

/// Default matcher for JSON object rows.
///
/// The keyword matches when any top-level string field contains it,
/// ignoring case. Every extra filter must equal the row's field of the
/// same name (a missing field compares as `null`).
#[must_use]
pub fn json_matcher(row: &Value, query: &ListQuery) -> bool {
    let keyword_ok = match query.keyword.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(keyword) => {
            let needle = keyword.to_lowercase();
            row.as_object().is_some_and(|fields| {
                fields
                    .values()
                    .filter_map(Value::as_str)
                    .any(|text| text.to_lowercase().contains(&needle))
            })
        }
    };

    keyword_ok
        && query
            .extra
            .iter()
            .all(|(key, expected)| row.get(key).unwrap_or(&Value::Null) == expected)
}
