//! Flat exact-name listener registry.

use std::collections::HashMap;

use crate::listener::{Entry, Listener, ListenerList, Slot};

/// Exact-name registry: one [`Slot`] per event name.
///
/// This is the authoritative registry for `emit` and `listeners`; the
/// wildcard tree only ever adds a second index over the same registrations.
#[derive(Debug, Default)]
pub(crate) struct ListenerStore {
    slots: HashMap<String, Slot>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, name: &str, entry: Entry, max: usize) {
        self.slots
            .entry(name.to_owned())
            .or_default()
            .add(entry, max, name);
    }

    /// Erase the first registration for `name` matching `target` by handle
    /// or origin identity. The whole entry is dropped when the slot empties.
    /// Returns whether anything was erased.
    pub(crate) fn remove(&mut self, name: &str, target: &Listener) -> bool {
        let Some(slot) = self.slots.get_mut(name) else {
            return false;
        };
        let matched = slot.remove(target);
        if matched && slot.is_empty() {
            self.slots.remove(name);
        }
        matched
    }

    /// Clear one name, or the entire registry when `name` is `None`.
    pub(crate) fn remove_all(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                self.slots.remove(name);
            }
            None => self.slots.clear(),
        }
    }

    /// Ordered listeners for `name`.
    ///
    /// Mirrors the original registry's read side effects: a stored bare
    /// single is coerced into a one-element sequence in place, and an absent
    /// name memoizes an empty sequence into the store.
    pub(crate) fn get(&mut self, name: &str) -> Vec<Listener> {
        let slot = self
            .slots
            .entry(name.to_owned())
            .or_insert_with(|| Slot::Many(ListenerList::default()));
        slot.coerce_many();
        slot.snapshot().unwrap_or_default()
    }

    /// Ordered listeners for `name` without any store mutation; `None` when
    /// no entry exists (a memoized empty entry yields `Some` of empty).
    pub(crate) fn snapshot(&self, name: &str) -> Option<Vec<Listener>> {
        self.slots.get(name).and_then(Slot::snapshot)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Whether `name` holds exactly the bare single-listener form.
    pub(crate) fn is_single(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Slot::One(_)))
    }

    #[cfg(test)]
    pub(crate) fn warned(&self, name: &str) -> bool {
        self.slots.get(name).is_some_and(Slot::warned)
    }
}
