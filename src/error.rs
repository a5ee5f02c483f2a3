//! List controller error types.
//!
//! [`ListError`] is the central error type for the crate. It is what a
//! [`crate::fetch::PageFetcher`] rejects with and what a
//! [`crate::controller::PendingFetch`] resolves to on failure. The
//! controller never presents errors itself; the presentation layer decides
//! how to surface them (toast, banner, retry button).

/// Errors produced while loading a page of remote list data.
///
/// # Error Code Ranges
///
/// | Range     | Category        |
/// |-----------|-----------------|
/// | 2000–2999 | Fetch           |
/// | 3000–3999 | Internal        |
///
/// Codes travel with [`crate::domain::ListEventKind::FetchFailed`].
///
/// The type is `Clone` so a single fetch result can be shared with every
/// awaiter of the same [`crate::controller::PendingFetch`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// The remote source failed (network or server error).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The remote source answered with a payload that is not a page.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The fetcher panicked instead of returning a rejected future.
    #[error("fetcher panicked: {0}")]
    FetcherPanicked(String),

    /// Internal failure (e.g. the fetch task was aborted by the runtime).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ListError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Fetch(_) => 2001,
            Self::InvalidResponse(_) => 2002,
            Self::FetcherPanicked(_) => 2003,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns `true` if retrying the same query may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Internal(_))
    }
}

impl From<serde_json::Error> for ListError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
