//! Service layer: caller-owned helpers built on top of a controller.
//!
//! [`StatusPoller`] reloads a list while rows are still processing and
//! [`SelectionSet`] keeps a multi-select across pages. Neither is owned by
//! the controller; a view creates them alongside it.

pub mod poller;
pub mod selection;

pub use poller::{PollStop, StatusPoller};
pub use selection::SelectionSet;
