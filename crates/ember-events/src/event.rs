//! The value handed to listeners on delivery.

use serde_json::Value;

/// A single delivered event: the emitted name plus its arguments.
///
/// One `Event` is built per emission and shared by reference with every
/// listener in the dispatch batch.
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    args: Vec<Value>,
}

impl Event {
    pub(crate) fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The event name this delivery was emitted under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The emission arguments, in order.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The argument at `index`, if present.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}
