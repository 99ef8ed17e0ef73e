//! Emitter configuration.

use serde::{Deserialize, Serialize};

/// Default listener count per name above which the leak warning fires.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Default separator splitting an event name into path segments.
pub const DEFAULT_DELIMITER: &str = ".";

/// Construction-time options for an [`Emitter`](crate::Emitter).
///
/// Every field carries a serde default, so a partial document deserializes
/// into a working configuration. All fields are fixed for the emitter's
/// lifetime except `max_listeners`, which
/// [`set_max_listeners`](crate::Emitter::set_max_listeners) may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Maintain the hierarchical wildcard registry alongside the flat one.
    pub wildcard: bool,
    /// Log registrations at `debug` instead of `trace`.
    pub verbose: bool,
    /// Separator splitting an event name into path segments.
    pub delimiter: String,
    /// Listener count per name above which the leak warning fires once.
    /// `0` disables the warning.
    pub max_listeners: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            wildcard: false,
            verbose: false,
            delimiter: DEFAULT_DELIMITER.to_owned(),
            max_listeners: DEFAULT_MAX_LISTENERS,
        }
    }
}

impl EmitterConfig {
    /// Defaults with the wildcard registry enabled.
    #[must_use]
    pub fn with_wildcard() -> Self {
        Self {
            wildcard: true,
            ..Self::default()
        }
    }
}
