//! Domain layer: query and page types, row identity, and the event system.
//!
//! These types are shared by the controller, the fetchers and the
//! caller-owned services. None of them perform I/O.

pub mod controller_id;
pub mod event_bus;
pub mod list_event;
pub mod page;
pub mod query;
pub mod row;

pub use controller_id::ControllerId;
pub use event_bus::EventBus;
pub use list_event::{FetchReason, ListEvent, ListEventKind};
pub use page::{ListResult, clamp_page, page_count};
pub use query::{FilterPatch, Filters, ListQuery};
pub use row::{JsonId, Row, merge_shallow};
