//! Type-safe controller identifier.

use std::fmt;

use serde::Serialize;

/// Unique identifier for one [`crate::controller::RemoteListController`].
///
/// Wraps a UUID v4 generated at construction. It tags every
/// [`super::ListEvent`] and tracing span so that several list views living
/// side by side (files, QA pairs, fine-tune jobs) can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ControllerId(uuid::Uuid);

impl ControllerId {
    /// Creates a new random `ControllerId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ControllerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(ControllerId::new(), ControllerId::new());
    }

    #[test]
    fn serializes_as_its_display_form() {
        let id = ControllerId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{id}\""));
        assert!(uuid::Uuid::parse_str(&id.to_string()).is_ok());
    }
}
