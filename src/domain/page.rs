//! Page results and pagination arithmetic.

use serde::{Deserialize, Serialize};

/// One page of rows as returned by a [`crate::fetch::PageFetcher`].
///
/// `total` counts every row matching the query, independent of page size.
/// Deserializes from the common REST envelopes:
///
/// ```json
/// { "data": [ { "id": 1 } ], "total": 41 }
/// { "list": [ { "id": 1 } ], "count": 41 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<R> {
    /// Rows on the requested page, in server order.
    #[serde(alias = "list", alias = "items")]
    pub data: Vec<R>,
    /// Total number of rows matching the query.
    #[serde(alias = "count")]
    pub total: u64,
}

impl<R> ListResult<R> {
    /// Creates a page from rows and the total matching count.
    #[must_use]
    pub fn new(data: Vec<R>, total: u64) -> Self {
        Self { data, total }
    }

    /// An empty result with `total == 0`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
        }
    }
}

impl<R> From<Vec<R>> for ListResult<R> {
    /// Treats the rows as the complete result set.
    fn from(data: Vec<R>) -> Self {
        let total = data.len() as u64;
        Self { data, total }
    }
}

/// Number of pages needed for `total` rows, at least 1.
#[must_use]
pub fn page_count(total: u64, page_size: u32) -> u32 {
    let pages = total.div_ceil(u64::from(page_size.max(1))).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Clamps `page` into `[1, page_count(total, page_size)]`.
#[must_use]
pub fn clamp_page(page: u32, total: u64, page_size: u32) -> u32 {
    page.clamp(1, page_count(total, page_size))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_count_has_floor_of_one() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(2, 2), 1);
    }

    #[test]
    fn clamp_page_bounds() {
        assert_eq!(clamp_page(0, 50, 10), 1);
        assert_eq!(clamp_page(3, 50, 10), 3);
        assert_eq!(clamp_page(9, 50, 10), 5);
        assert_eq!(clamp_page(2, 2, 2), 1);
    }

    #[test]
    fn decodes_data_total_envelope() {
        let raw = json!({ "data": [ { "id": 1 }, { "id": 2 } ], "total": 41 });
        let page: Result<ListResult<serde_json::Value>, _> = serde_json::from_value(raw);
        let Ok(page) = page else {
            panic!("envelope should decode");
        };
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total, 41);
    }

    #[test]
    fn decodes_list_count_aliases() {
        let raw = json!({ "list": [ { "id": "a" } ], "count": 7 });
        let page: ListResult<serde_json::Value> =
            serde_json::from_value(raw).unwrap_or_else(|_| ListResult::empty());
        assert_eq!(page.total, 7);
        assert_eq!(page.data.len(), 1);
    }

    #[test]
    fn from_vec_counts_rows() {
        let page = ListResult::from(vec![1, 2, 3]);
        assert_eq!(page.total, 3);
    }
}
