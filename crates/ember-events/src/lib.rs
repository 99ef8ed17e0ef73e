//! Ember Events - synchronous hierarchical event emitter.
//!
//! This crate provides:
//! - Named-event registration with single, counted (`many`/`once`) and
//!   removable listeners
//! - Synchronous, registration-ordered delivery on the caller's stack
//! - An optional delimiter-segmented wildcard registry for hierarchical
//!   names
//!
//! # Architecture
//!
//! Listeners are registered on an [`Emitter`] under string names. A flat
//! exact-name registry is always authoritative for dispatch and
//! introspection; in wildcard mode, names containing the delimiter are
//! additionally indexed in a segment tree that
//! [`Emitter::listeners_matching`] can query with `*` segments.
//!
//! Delivery is fully synchronous: `emit` invokes every matched listener on
//! the calling stack before returning. Listeners may re-enter the emitter;
//! an in-flight dispatch works off a snapshot taken before the first
//! invocation.
//!
//! # Example
//!
//! ```rust
//! use ember_events::{handler, Emitter, EmitterConfig};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), ember_events::EmitterError> {
//! let emitter = Emitter::new(EmitterConfig::default());
//!
//! let greeter = handler(|event| {
//!     println!("hello, {}", event.arg(0).cloned().unwrap_or_default());
//! });
//! emitter.on("greeting", greeter.clone())?;
//!
//! assert!(emitter.emit("greeting", vec![json!("world")])?);
//!
//! emitter.un("greeting", &greeter);
//! assert!(!emitter.emit("greeting", vec![json!("nobody")])?);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod config;
mod emitter;
mod error;
mod event;
mod listener;
mod store;
mod tree;

pub use config::{EmitterConfig, DEFAULT_DELIMITER, DEFAULT_MAX_LISTENERS};
pub use emitter::{Emitter, ERROR_EVENT, NEW_LISTENER};
pub use error::EmitterError;
pub use event::Event;
pub use listener::{handler, same_listener, Handler, Listener};
