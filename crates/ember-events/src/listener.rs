//! Listener handles and per-name listener storage.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::event::Event;

/// Callback invoked for every event delivered to it.
///
/// Implemented for all `Fn(&Event) + Send + Sync` closures; implement it
/// directly when the listener needs its own state or a custom invocation
/// path.
pub trait Handler: Send + Sync {
    /// Handle one delivered event.
    fn call(&self, event: &Event);
}

impl<F> Handler for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn call(&self, event: &Event) {
        self(event);
    }
}

/// Shared handle to a registered callback.
///
/// Identity is the `Arc` allocation: keep a clone of the handle passed to
/// `on` to remove the same registration later.
pub type Listener = Arc<dyn Handler>;

/// Wrap a closure into a [`Listener`] handle.
pub fn handler<F>(f: F) -> Listener
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Whether two handles refer to the same underlying listener allocation.
#[must_use]
pub fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

/// One registered listener: the stored callable plus a back-reference to the
/// original callable when the stored one is a TTL delegate.
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) callable: Listener,
    pub(crate) origin: Option<Listener>,
}

impl Entry {
    pub(crate) fn direct(callable: Listener) -> Self {
        Self {
            callable,
            origin: None,
        }
    }

    pub(crate) fn with_origin(callable: Listener, origin: Listener) -> Self {
        Self {
            callable,
            origin: Some(origin),
        }
    }

    /// True when `target` is this entry's callable or its origin.
    pub(crate) fn matches(&self, target: &Listener) -> bool {
        same_listener(&self.callable, target)
            || self
                .origin
                .as_ref()
                .is_some_and(|origin| same_listener(origin, target))
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("callable", &Arc::as_ptr(&self.callable))
            .field("has_origin", &self.origin.is_some())
            .finish()
    }
}

/// An ordered sequence of entries with its at-most-once leak warning flag.
///
/// The flag belongs to the sequence, so dropping and recreating a slot arms
/// the warning again.
#[derive(Debug, Default)]
pub(crate) struct ListenerList {
    pub(crate) entries: Vec<Entry>,
    pub(crate) warned: bool,
}

/// Storage for the listeners of one event name.
///
/// Promotion only ever moves forward: empty, then a bare single, then a
/// sequence. A slot is never demoted; removal that empties it drops the
/// whole slot from the owning map instead.
#[derive(Debug, Default)]
pub(crate) enum Slot {
    #[default]
    Empty,
    One(Entry),
    Many(ListenerList),
}

impl Slot {
    /// Add `entry` with promotion. Once the sequence outgrows `max` (and
    /// `max` is non-zero) a leak warning fires, at most once per sequence.
    pub(crate) fn add(&mut self, entry: Entry, max: usize, name: &str) {
        match std::mem::take(self) {
            Slot::Empty => *self = Slot::One(entry),
            Slot::One(first) => {
                *self = Slot::Many(ListenerList {
                    entries: vec![first, entry],
                    warned: false,
                });
            }
            Slot::Many(mut list) => {
                list.entries.push(entry);
                if !list.warned && max > 0 && list.entries.len() > max {
                    list.warned = true;
                    warn!(
                        event = name,
                        count = list.entries.len(),
                        max_listeners = max,
                        "possible listener leak detected; \
                         use set_max_listeners to raise the limit"
                    );
                }
                *self = Slot::Many(list);
            }
        }
    }

    /// Erase the first entry matching `target` by callable or origin
    /// identity. Returns whether a match was erased; the caller drops the
    /// slot from its map when it reports empty afterwards.
    pub(crate) fn remove(&mut self, target: &Listener) -> bool {
        match self {
            Slot::Empty => false,
            Slot::One(entry) => {
                if entry.matches(target) {
                    *self = Slot::Empty;
                    true
                } else {
                    false
                }
            }
            Slot::Many(list) => {
                match list.entries.iter().position(|entry| entry.matches(target)) {
                    Some(position) => {
                        list.entries.remove(position);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Coerce the bare single form into a one-element sequence. Read side
    /// effect of `listeners`; the fresh sequence starts unwarned.
    pub(crate) fn coerce_many(&mut self) {
        if matches!(self, Slot::One(_)) {
            if let Slot::One(entry) = std::mem::take(self) {
                *self = Slot::Many(ListenerList {
                    entries: vec![entry],
                    warned: false,
                });
            }
        }
    }

    /// Clone the ordered callables, `None` when no registration entry exists
    /// at all. A present-but-empty sequence yields `Some` of an empty vec.
    pub(crate) fn snapshot(&self) -> Option<Vec<Listener>> {
        match self {
            Slot::Empty => None,
            Slot::One(entry) => Some(vec![entry.callable.clone()]),
            Slot::Many(list) => Some(
                list.entries
                    .iter()
                    .map(|entry| entry.callable.clone())
                    .collect(),
            ),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Slot::Empty => true,
            Slot::One(_) => false,
            Slot::Many(list) => list.entries.is_empty(),
        }
    }

    #[cfg(test)]
    pub(crate) fn warned(&self) -> bool {
        matches!(self, Slot::Many(list) if list.warned)
    }
}
