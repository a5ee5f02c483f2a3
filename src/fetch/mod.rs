//! Fetch layer: the page-source contract and an in-memory implementation.
//!
//! The controller consumes any [`PageFetcher`]. REST wrappers implement it
//! directly or through [`fetch_fn`]; [`MemorySource`] serves demos and tests.

pub mod fetcher;
pub mod memory;

pub use fetcher::{FnFetcher, PageFetcher, fetch_fn};
pub use memory::{MemorySource, json_matcher};
