//! Construction options for a list controller.

use crate::config::{DEFAULT_PAGE_SIZE, ListConfig};

/// Options fixed for the lifetime of a [`super::RemoteListController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Rows per page. Values below 1 are raised to 1.
    pub page_size: u32,

    /// When `true`, `reload()` does not raise `loading`, so periodic
    /// refreshes do not flash a spinner.
    pub cancel_loading_when_reload: bool,

    /// When `true`, nothing is fetched until the first `search()` or
    /// `filter_data()` call (the list depends on a prerequisite selection).
    pub un_init_data: bool,

    /// Page to start on, e.g. restored after returning from a detail view.
    pub initial_page: u32,

    /// Capacity of the controller's event broadcast channel.
    pub event_bus_capacity: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cancel_loading_when_reload: false,
            un_init_data: false,
            initial_page: 1,
            event_bus_capacity: 256,
        }
    }
}

impl ControllerOptions {
    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Enables or disables silent reloads.
    #[must_use]
    pub fn with_cancel_loading_when_reload(mut self, enabled: bool) -> Self {
        self.cancel_loading_when_reload = enabled;
        self
    }

    /// Defers the first fetch until `search()` or `filter_data()`.
    #[must_use]
    pub fn with_un_init_data(mut self, enabled: bool) -> Self {
        self.un_init_data = enabled;
        self
    }

    /// Starts on `page` instead of page 1.
    #[must_use]
    pub fn with_initial_page(mut self, page: u32) -> Self {
        self.initial_page = page.max(1);
        self
    }
}

impl From<&ListConfig> for ControllerOptions {
    fn from(config: &ListConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            cancel_loading_when_reload: config.cancel_loading_when_reload,
            event_bus_capacity: config.event_bus_capacity,
            ..Self::default()
        }
    }
}
