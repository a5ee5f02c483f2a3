//! List configuration loaded from environment variables.
//!
//! Follows 12-factor style: every setting comes from an environment
//! variable (or a `.env` file via `dotenvy`) and falls back to a default
//! when missing or unparsable.

use std::time::Duration;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size accepted from configuration.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Top-level list configuration.
///
/// Loaded once at startup via [`ListConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    /// Rows per page for newly created controllers.
    pub page_size: u32,

    /// Whether `reload()` refreshes silently, without raising `loading`.
    pub cancel_loading_when_reload: bool,

    /// Interval between status polls.
    pub poll_interval: Duration,

    /// Capacity of each controller's event broadcast channel.
    pub event_bus_capacity: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cancel_loading_when_reload: false,
            poll_interval: Duration::from_millis(3000),
            event_bus_capacity: 256,
        }
    }
}

impl ListConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    /// Recognized keys: `LIST_PAGE_SIZE`, `LIST_CANCEL_LOADING_WHEN_RELOAD`,
    /// `LIST_POLL_INTERVAL_MS`, `LIST_EVENT_BUS_CAPACITY`.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let page_size = parse_env("LIST_PAGE_SIZE", defaults.page_size).clamp(1, MAX_PAGE_SIZE);
        let cancel_loading_when_reload = parse_env_bool(
            "LIST_CANCEL_LOADING_WHEN_RELOAD",
            defaults.cancel_loading_when_reload,
        );
        let poll_interval_ms = parse_env("LIST_POLL_INTERVAL_MS", 3000_u64).max(1);
        let event_bus_capacity =
            parse_env("LIST_EVENT_BUS_CAPACITY", defaults.event_bus_capacity).max(1);

        Self {
            page_size,
            cancel_loading_when_reload,
            poll_interval: Duration::from_millis(poll_interval_ms),
            event_bus_capacity,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    parse_bool(std::env::var(key).ok().as_deref()).unwrap_or(default)
}

fn parse_bool(raw: Option<&str>) -> Option<bool> {
    let raw = raw?.trim();
    if raw.eq_ignore_ascii_case("true") || raw == "1" {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = ListConfig::default();
        assert_eq!(cfg.page_size, 10);
        assert!(!cfg.cancel_loading_when_reload);
        assert_eq!(cfg.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn bool_parsing_is_case_insensitive() {
        assert_eq!(parse_bool(Some("TRUE")), Some(true));
        assert_eq!(parse_bool(Some("True")), Some(true));
        assert_eq!(parse_bool(Some("1")), Some(true));
        assert_eq!(parse_bool(Some("false")), Some(false));
        assert_eq!(parse_bool(Some("0")), Some(false));
        assert_eq!(parse_bool(Some("yes")), None);
        assert_eq!(parse_bool(None), None);
    }

    #[test]
    fn missing_variable_falls_back() {
        let value: u32 = parse_env("REMOTE_LIST_TEST_SURELY_UNSET_KEY", 42);
        assert_eq!(value, 42);
    }
}
