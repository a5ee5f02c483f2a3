//! Reactive state exposed to the presentation layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::page_count;

/// Snapshot of a controller's list state.
///
/// `data` is shared behind an [`Arc`]. Any change to the rows (commit or
/// local patch) installs a new `Arc`, so `Arc::ptr_eq` against a previous
/// snapshot tells a renderer whether the rows changed.
#[derive(Debug, Clone)]
pub struct ControllerState<R> {
    /// Current 1-based page.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Total rows matching the current query.
    pub total: u64,
    /// Rows of the current page.
    pub data: Arc<Vec<R>>,
    /// A fetch that shows a spinner is in flight.
    pub loading: bool,
    /// At least one fetch has been committed since construction or `clean()`.
    pub loaded: bool,
    /// When the current rows were committed.
    pub loaded_at: Option<DateTime<Utc>>,
}

impl<R> ControllerState<R> {
    /// Empty, unloaded state on `page`.
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            total: 0,
            data: Arc::new(Vec::new()),
            loading: false,
            loaded: false,
            loaded_at: None,
        }
    }

    /// Rows of the current page.
    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.data
    }

    /// Number of pages for the current total, at least 1.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        page_count(self.total, self.page_size)
    }

    /// Returns `true` if a later page exists.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.page < self.page_count()
    }

    /// Returns `true` if an earlier page exists.
    #[must_use]
    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }
}
