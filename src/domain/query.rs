//! Query parameters sent to the page fetcher on every load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extra filter parameters merged into every request.
///
/// Ordered so that two queries with the same filters compare (and
/// serialize) identically regardless of insertion order.
pub type Filters = BTreeMap<String, Value>;

/// The merged `{page, page_size, keyword, ...extra}` handed to a
/// [`crate::fetch::PageFetcher`].
///
/// Serializes flat, the way a REST list endpoint expects its query:
///
/// ```json
/// { "page": 2, "page_size": 20, "keyword": "invoice", "status": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Current 1-based page index.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
    /// Last keyword passed to `search()`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Additional filters set through `filter_data()`.
    #[serde(flatten)]
    pub extra: Filters,
}

impl ListQuery {
    /// Creates a query for `page` with no keyword and no filters.
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            keyword: None,
            extra: Filters::new(),
        }
    }

    /// Zero-based index of the first row on this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Returns the filter value stored under `key`.
    #[must_use]
    pub fn filter(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Flattens the query into string pairs for a URL query string.
    ///
    /// String filter values are emitted unquoted; other JSON values use
    /// their compact JSON text. Removed filters never appear, so a cleared
    /// filter cannot leak out as `"undefined"`.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.extra.len().saturating_add(3));
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("page_size".to_string(), self.page_size.to_string()));
        if let Some(keyword) = &self.keyword {
            params.push(("keyword".to_string(), keyword.clone()));
        }
        for (key, value) in &self.extra {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            params.push((key.clone(), rendered));
        }
        params
    }
}

/// A partial update to the extra filters.
///
/// `Some(value)` sets a filter, `None` removes it (the equivalent of
/// passing `undefined`). An explicit JSON `null` is kept as a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    entries: BTreeMap<String, Option<Value>>,
}

impl FilterPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), Some(value.into()));
        self
    }

    /// Removes the filter stored under `key`.
    #[must_use]
    pub fn unset(mut self, key: impl Into<String>) -> Self {
        self.entries.insert(key.into(), None);
        self
    }

    /// Returns `true` if the patch carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges the patch into `filters`.
    pub fn apply_to(&self, filters: &mut Filters) {
        for (key, value) in &self.entries {
            match value {
                Some(value) => {
                    filters.insert(key.clone(), value.clone());
                }
                None => {
                    filters.remove(key);
                }
            }
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Value>)> for FilterPatch {
    fn from_iter<I: IntoIterator<Item = (K, Option<Value>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
