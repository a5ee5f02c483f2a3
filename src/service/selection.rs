//! Cross-page multi-select.
//!
//! Tracks selected row IDs independently of the controller, so a
//! selection survives page changes and searches. Page-level helpers take
//! the rows currently shown (the controller's `data`) to answer "is every
//! row on this page selected" for the header checkbox.

use std::collections::HashSet;
use std::hash::Hash;

use crate::domain::Row;

/// Set of selected row IDs spanning any number of pages.
#[derive(Debug, Clone)]
pub struct SelectionSet<K> {
    ids: HashSet<K>,
}

impl<K> Default for SelectionSet<K> {
    fn default() -> Self {
        Self {
            ids: HashSet::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> SelectionSet<K> {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `id`. Returns `true` if it was not selected before.
    pub fn select(&mut self, id: K) -> bool {
        self.ids.insert(id)
    }

    /// Deselects `id`. Returns `true` if it was selected.
    pub fn deselect(&mut self, id: &K) -> bool {
        self.ids.remove(id)
    }

    /// Flips `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: K) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Returns `true` if `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &K) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected IDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Clears the selection (e.g. after a bulk delete succeeded).
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keeps only the IDs for which `keep` returns `true`.
    pub fn retain<F: FnMut(&K) -> bool>(&mut self, keep: F) {
        self.ids.retain(keep);
    }

    /// Iterates over the selected IDs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.ids.iter()
    }

    /// Selected IDs collected for a bulk request.
    #[must_use]
    pub fn to_vec(&self) -> Vec<K> {
        self.ids.iter().cloned().collect()
    }
}

impl<K: Clone + Eq + Hash + Send + Sync + 'static> SelectionSet<K> {
    /// Selects every identifiable row on the page.
    pub fn select_page<R: Row<Id = K>>(&mut self, rows: &[R]) {
        self.ids.extend(rows.iter().filter_map(R::row_id));
    }

    /// Deselects every row on the page, keeping other pages' selections.
    pub fn deselect_page<R: Row<Id = K>>(&mut self, rows: &[R]) {
        for id in rows.iter().filter_map(R::row_id) {
            self.ids.remove(&id);
        }
    }

    /// Header-checkbox behavior: deselects the page if it is fully
    /// selected, otherwise selects all of it. Returns whether the page is
    /// fully selected afterwards.
    pub fn toggle_page<R: Row<Id = K>>(&mut self, rows: &[R]) -> bool {
        if self.is_page_selected(rows) {
            self.deselect_page(rows);
            false
        } else {
            self.select_page(rows);
            self.is_page_selected(rows)
        }
    }

    /// Returns `true` if the page has identifiable rows and all of them
    /// are selected.
    #[must_use]
    pub fn is_page_selected<R: Row<Id = K>>(&self, rows: &[R]) -> bool {
        let mut ids = rows.iter().filter_map(R::row_id).peekable();
        ids.peek().is_some() && ids.all(|id| self.ids.contains(&id))
    }

    /// Returns `true` if some, but not all, rows on the page are selected.
    #[must_use]
    pub fn is_page_partially_selected<R: Row<Id = K>>(&self, rows: &[R]) -> bool {
        let selected = rows
            .iter()
            .filter_map(R::row_id)
            .filter(|id| self.ids.contains(id))
            .count();
        selected > 0 && !self.is_page_selected(rows)
    }
}
