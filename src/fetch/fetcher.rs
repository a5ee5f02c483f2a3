//! The page-fetch contract consumed by the controller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::domain::{ListQuery, ListResult};
use crate::error::ListError;

/// Asynchronous source of list pages (usually a REST call wrapper).
///
/// Implementations must resolve to an empty [`ListResult`] when nothing
/// matches and reject only on genuine failures. Returning an error object
/// inside `Ok` would bypass the controller's failure path.
pub trait PageFetcher<R>: Send + Sync + 'static {
    /// Loads the page described by `query`.
    fn fetch_page(&self, query: ListQuery) -> BoxFuture<'_, Result<ListResult<R>, ListError>>;
}

impl<R, T: PageFetcher<R>> PageFetcher<R> for Arc<T> {
    fn fetch_page(&self, query: ListQuery) -> BoxFuture<'_, Result<ListResult<R>, ListError>> {
        (**self).fetch_page(query)
    }
}

/// Adapter turning an async closure into a [`PageFetcher`].
///
/// Built by [`fetch_fn`].
pub struct FnFetcher<F> {
    f: F,
}

impl<F> fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}

/// Wraps `f` so it can be handed to a controller.
///
/// ```ignore
/// let fetcher = fetch_fn(move |query: ListQuery| {
///     let api = api.clone();
///     async move { api.list_files(&query).await }
/// });
/// ```
pub fn fetch_fn<R, F, Fut>(f: F) -> FnFetcher<F>
where
    F: Fn(ListQuery) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ListResult<R>, ListError>> + Send + 'static,
{
    FnFetcher { f }
}

impl<R, F, Fut> PageFetcher<R> for FnFetcher<F>
where
    F: Fn(ListQuery) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ListResult<R>, ListError>> + Send + 'static,
{
    fn fetch_page(&self, query: ListQuery) -> BoxFuture<'_, Result<ListResult<R>, ListError>> {
        (self.f)(query).boxed()
    }
}
