//! Controller layer: the paginated remote-list state machine.
//!
//! [`RemoteListController`] owns pagination, keyword and filter state for
//! one list view and commits fetched pages race-safely into a
//! [`ControllerState`] the presentation layer renders from.

pub mod list_controller;
pub mod options;
pub mod pending;
pub mod state;

pub use list_controller::RemoteListController;
pub use options::ControllerOptions;
pub use pending::{FetchOutcome, PendingFetch};
pub use state::ControllerState;
