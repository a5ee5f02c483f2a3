//! # remote-list
//!
//! Race-safe paginated remote-list controller for list-style admin views
//! (knowledge libraries, files, QA pairs, users, roles, fine-tune jobs,
//! audit logs).
//!
//! A [`controller::RemoteListController`] owns pagination, keyword and
//! filter state for one view, fetches pages through a
//! [`fetch::PageFetcher`], and publishes [`controller::ControllerState`]
//! for rendering. Rendering, routing and HTTP transport stay outside.
//!
//! ## Architecture
//!
//! ```text
//! Presentation layer (renders state, issues intents)
//!     │
//!     ├── StatusPoller / SelectionSet (service/)
//!     │
//!     ├── RemoteListController (controller/)
//!     │       ├── watch::Sender<ControllerState>
//!     │       └── EventBus → ListEvent (domain/)
//!     │
//!     └── PageFetcher (fetch/)
//!             ├── fetch_fn(|query| async { .. })  → REST wrapper
//!             └── MemorySource                    → demos and tests
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use remote_list::controller::{ControllerOptions, RemoteListController};
//! use remote_list::domain::FilterPatch;
//! use remote_list::fetch::MemorySource;
//! use serde_json::json;
//!
//! # async fn demo() {
//! let source = MemorySource::json(vec![json!({ "id": 1, "status": 3 })]);
//! let files = RemoteListController::new(source, ControllerOptions::default());
//! let _ = files.filter_data(FilterPatch::new().set("status", 3)).await;
//! assert_eq!(files.state().total, 1);
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod service;
