//! Lifecycle events emitted by a list controller.
//!
//! Every state transition publishes a [`ListEvent`] through the
//! controller's [`super::EventBus`]. Observers (pollers, audit panels,
//! tests) subscribe to follow fetch sequencing without touching state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ControllerId;

/// Why a fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchReason {
    /// Initial load at construction.
    Initial,
    /// `set_page()` moved to another page.
    Navigate,
    /// `search()` changed the keyword.
    Search,
    /// `filter_data()` changed the extra filters.
    Filter,
    /// `reload()` re-issued the current query.
    Reload,
    /// A committed total showed the page was out of range.
    Clamp,
}

/// One controller transition, stamped by the bus that published it.
///
/// Serializes flat:
///
/// ```json
/// { "controller_id": "…", "timestamp": "…", "event_type": "page_committed", "seq": 3, … }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ListEvent {
    /// Controller that emitted the event.
    pub controller_id: ControllerId,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    #[serde(flatten)]
    pub kind: ListEventKind,
}

/// What a [`ListEvent`] reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ListEventKind {
    /// A fetch was tagged with a sequence number and handed to the fetcher.
    FetchIssued {
        /// Sequence number of the fetch.
        seq: u64,
        /// Requested page.
        page: u32,
        /// What triggered the fetch.
        reason: FetchReason,
        /// `loading` was left untouched.
        silent: bool,
    },

    /// The latest fetch resolved and its rows became the current page.
    PageCommitted {
        /// Sequence number of the fetch.
        seq: u64,
        /// Committed page.
        page: u32,
        /// Number of rows on the page.
        rows: usize,
        /// Total matching rows reported by the source.
        total: u64,
    },

    /// A superseded fetch resolved and its result was dropped.
    ResultDiscarded {
        /// Sequence number of the stale fetch.
        seq: u64,
        /// Rejection message, if the stale fetch failed.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// The latest fetch failed; previous rows were kept.
    FetchFailed {
        /// Sequence number of the failed fetch.
        seq: u64,
        /// Numeric error code.
        code: u32,
        /// Error message.
        message: String,
    },

    /// A requested page was outside `[1, page_count]` and was clamped.
    PageClamped {
        /// Page that was asked for.
        requested: u32,
        /// Page actually used.
        page: u32,
    },

    /// Rows on the current page were patched locally.
    RowsPatched {
        /// Number of rows the patch touched.
        rows: usize,
    },

    /// The controller was reset to an empty, unloaded state.
    Cleaned,
}

impl ListEventKind {
    /// Returns the sequence number for fetch-related events.
    #[must_use]
    pub const fn seq(&self) -> Option<u64> {
        match self {
            Self::FetchIssued { seq, .. }
            | Self::PageCommitted { seq, .. }
            | Self::ResultDiscarded { seq, .. }
            | Self::FetchFailed { seq, .. } => Some(*seq),
            Self::PageClamped { .. } | Self::RowsPatched { .. } | Self::Cleaned => None,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::FetchIssued { .. } => "fetch_issued",
            Self::PageCommitted { .. } => "page_committed",
            Self::ResultDiscarded { .. } => "result_discarded",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::PageClamped { .. } => "page_clamped",
            Self::RowsPatched { .. } => "rows_patched",
            Self::Cleaned => "cleaned",
        }
    }
}
