//! Awaitable handle for an issued fetch.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};

use crate::error::ListError;

pub(crate) type SharedFetch = Shared<BoxFuture<'static, Result<FetchOutcome, ListError>>>;

/// How an issued fetch ended, from the controller's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The fetch was the latest one and its rows are now the current page.
    Committed {
        /// Page the rows were committed for.
        page: u32,
        /// Number of rows committed.
        rows: usize,
        /// Total matching rows.
        total: u64,
    },
    /// A newer fetch (or `clean()`) made this result obsolete; state was
    /// left untouched.
    Superseded {
        /// The rejection, if the obsolete fetch failed.
        error: Option<ListError>,
    },
    /// No fetch was issued: the query was unchanged, or the controller is
    /// still waiting for its first `search()`/`filter_data()`.
    Skipped,
    /// The controller was dropped before the fetch resolved.
    Detached,
}

/// Handle to a fetch issued by a [`super::RemoteListController`].
///
/// The fetch runs on the tokio runtime whether or not the handle is
/// awaited. Clones observe the same result, so both the caller of an
/// intent and [`super::RemoteListController::last_fetch`] can await it.
/// Rejections resolve to `Err` for the caller to present.
#[derive(Clone)]
pub struct PendingFetch {
    seq: Option<u64>,
    inner: Option<SharedFetch>,
}

impl PendingFetch {
    pub(crate) fn issued(seq: u64, inner: SharedFetch) -> Self {
        Self {
            seq: Some(seq),
            inner: Some(inner),
        }
    }

    pub(crate) fn skipped() -> Self {
        Self {
            seq: None,
            inner: None,
        }
    }

    /// Sequence number assigned at issue time, `None` if nothing was issued.
    #[must_use]
    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    /// Returns `true` if the intent did not issue a fetch.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.inner.is_none()
    }
}

impl fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFetch")
            .field("seq", &self.seq)
            .field("skipped", &self.is_skipped())
            .finish()
    }
}

impl Future for PendingFetch {
    type Output = Result<FetchOutcome, ListError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.inner.as_mut() {
            Some(fetch) => fetch.poll_unpin(cx),
            None => Poll::Ready(Ok(FetchOutcome::Skipped)),
        }
    }
}
