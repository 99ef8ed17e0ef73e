//! Prelude module - commonly used types for convenient import.
//!
//! Use `use ember_events::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use ember_events::prelude::*;
//! use serde_json::json;
//!
//! # fn example() -> Result<(), EmitterError> {
//! let emitter = Emitter::new(EmitterConfig::default());
//!
//! emitter.on("job.done", handler(|event| {
//!     println!("finished: {:?}", event.args());
//! }))?;
//!
//! emitter.emit("job.done", vec![json!("build")])?;
//! # Ok(())
//! # }
//! ```

// Emitter facade
pub use crate::{Emitter, ERROR_EVENT, NEW_LISTENER};

// Configuration
pub use crate::{EmitterConfig, DEFAULT_DELIMITER, DEFAULT_MAX_LISTENERS};

// Listeners and events
pub use crate::{handler, same_listener, Event, Handler, Listener};

// Errors
pub use crate::EmitterError;
