//! Error types for emitter operations.

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by [`Emitter`](crate::Emitter) operations.
///
/// Everything else is absorbed locally: removals and emissions against
/// missing registrations are no-ops, and the listener leak warning is a
/// diagnostic log, never an error.
#[derive(Debug, Error)]
pub enum EmitterError {
    /// An argument was structurally invalid, such as a zero invocation
    /// budget passed to [`many`](crate::Emitter::many).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An `error` event carrying an error-like payload was emitted without a
    /// dedicated single `error` listener to receive it.
    #[error("unhandled 'error' event: {0}")]
    UnhandledError(Value),

    /// An `error` event without a usable payload was emitted without a
    /// dedicated single `error` listener to receive it.
    #[error("uncaught, unspecified 'error' event")]
    UncaughtError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_carries_payload() {
        let err = EmitterError::UnhandledError(json!({"message": "boom"}));
        assert!(err.to_string().contains("boom"));

        let err = EmitterError::UncaughtError;
        assert_eq!(err.to_string(), "uncaught, unspecified 'error' event");
    }
}
