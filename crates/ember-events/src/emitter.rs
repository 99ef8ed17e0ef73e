//! Public emitter facade composing the flat store and the wildcard tree.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use serde_json::Value;
use tracing::{debug, trace};

use crate::config::EmitterConfig;
use crate::error::EmitterError;
use crate::event::Event;
use crate::listener::{Entry, Handler, Listener};
use crate::store::ListenerStore;
use crate::tree::ListenerTree;

/// Event delivered before every registration, carrying the registered name.
pub const NEW_LISTENER: &str = "newListener";

/// Event name with unhandled-is-fatal semantics.
pub const ERROR_EVENT: &str = "error";

#[derive(Debug)]
struct Shared {
    state: RwLock<State>,
}

#[derive(Debug)]
struct State {
    store: ListenerStore,
    /// Present only in wildcard mode.
    tree: Option<ListenerTree>,
    config: EmitterConfig,
}

/// Synchronous publish/subscribe facade.
///
/// Listeners are registered under string names and invoked on the caller's
/// stack, in registration order, when the same name is emitted. Cloning
/// shares the underlying registries.
///
/// **WARNING:** a listener that stores a cloned `Emitter` keeps the shared
/// registries alive through an `Arc` reference cycle. Long-lived listeners
/// that need to publish back should hold something weaker, or be removed
/// explicitly when done.
///
/// Registries are guarded by a lock that is never held across listener
/// invocation, so listeners may reentrantly call [`Emitter::on`],
/// [`Emitter::un`] or [`Emitter::emit`] on the emitter that is delivering to
/// them; an in-flight dispatch works off a snapshot taken before the first
/// invocation.
#[derive(Debug, Clone)]
pub struct Emitter {
    shared: Arc<Shared>,
}

impl Emitter {
    /// Create an emitter with the given configuration.
    #[must_use]
    pub fn new(config: EmitterConfig) -> Self {
        let tree = config.wildcard.then(ListenerTree::default);
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State {
                    store: ListenerStore::default(),
                    tree,
                    config,
                }),
            }),
        }
    }

    fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `listener` for `name`.
    ///
    /// A [`NEW_LISTENER`] event carrying `name` is emitted before the
    /// registration lands, so a `newListener` listener never observes its
    /// own registration. In wildcard mode a name containing the delimiter
    /// also enters the wildcard tree; a name starting or ending with the
    /// delimiter is reported through the `error` event instead of entering
    /// the tree, which fails the call when nobody handles `error`.
    pub fn on(&self, name: &str, listener: Listener) -> Result<&Self, EmitterError> {
        self.register(name, Entry::direct(listener))?;
        Ok(self)
    }

    /// Alias for [`Emitter::on`].
    pub fn add_listener(&self, name: &str, listener: Listener) -> Result<&Self, EmitterError> {
        self.on(name, listener)
    }

    /// Register `listener` for a single delivery.
    pub fn once(&self, name: &str, listener: Listener) -> Result<&Self, EmitterError> {
        self.many(name, 1, listener)
    }

    /// Register `listener` for at most `count` deliveries.
    ///
    /// The listener is wrapped in a counting delegate. On the expiring
    /// delivery the delegate unregisters itself first and invokes `listener`
    /// afterwards, so recursive emission from inside `listener` can never
    /// re-enter it. The delegate carries `listener` as its origin, so
    /// [`Emitter::un`] with the original handle removes it before it expires
    /// naturally.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `count` is zero.
    pub fn many(
        &self,
        name: &str,
        count: usize,
        listener: Listener,
    ) -> Result<&Self, EmitterError> {
        if count == 0 {
            return Err(EmitterError::InvalidArgument(
                "many requires a non-zero delivery count".to_owned(),
            ));
        }

        let delegate: Listener =
            TtlDelegate::new(name, count, listener.clone(), Arc::downgrade(&self.shared));
        self.register(name, Entry::with_origin(delegate, listener))?;
        Ok(self)
    }

    /// Deliver `args` to every listener registered for exactly `name`.
    ///
    /// Listeners run synchronously on the caller's stack, in registration
    /// order, against a snapshot taken before the first invocation. Returns
    /// `Ok(true)` when a registration entry existed for `name` (even an
    /// empty one left behind by [`Emitter::listeners`]) and `Ok(false)`
    /// otherwise.
    ///
    /// Two names are special:
    /// - [`NEW_LISTENER`] is a cheap no-op returning `Ok(false)` while
    ///   nothing is registered under it.
    /// - [`ERROR_EVENT`] without exactly one dedicated listener fails the
    ///   call instead of delivering; see [`EmitterError`].
    ///
    /// In wildcard mode an emitted name may carry `*` segments, but matching
    /// them against the tree is not part of dispatch: delivery is exact-name
    /// only, and wildcard registrations are observable through
    /// [`Emitter::listeners_matching`].
    pub fn emit(&self, name: &str, args: Vec<Value>) -> Result<bool, EmitterError> {
        let snapshot = {
            let state = self.read();

            if name == NEW_LISTENER && !state.store.contains(NEW_LISTENER) {
                return Ok(false);
            }

            if name == ERROR_EVENT && !state.store.is_single(ERROR_EVENT) {
                return Err(unhandled_error(args.first()));
            }

            state.store.snapshot(name)
        };

        let Some(listeners) = snapshot else {
            trace!(event = name, "no listeners for event");
            return Ok(false);
        };

        debug!(event = name, count = listeners.len(), "dispatching event");
        let event = Event::new(name, args);
        for listener in &listeners {
            listener.call(&event);
        }
        Ok(true)
    }

    /// Remove the first registration for `name` matching `listener` by
    /// handle identity or TTL-delegate origin. A missing match is a no-op.
    pub fn un(&self, name: &str, listener: &Listener) -> &Self {
        let removed = self.write().store.remove(name, listener);
        if removed {
            trace!(event = name, "listener removed");
        }
        self
    }

    /// Alias for [`Emitter::un`].
    pub fn remove_listener(&self, name: &str, listener: &Listener) -> &Self {
        self.un(name, listener)
    }

    /// Remove every listener for `name`, or for every name when `None`.
    pub fn remove_all_listeners(&self, name: Option<&str>) -> &Self {
        self.write().store.remove_all(name);
        self
    }

    /// Ordered listeners registered for exactly `name`.
    ///
    /// Carries the original registry's read side effects: a stored bare
    /// single is coerced into a one-element sequence, and an absent name
    /// memoizes an empty sequence into the store (visible to a later
    /// [`Emitter::emit`], which then reports a delivery with zero
    /// invocations).
    #[must_use]
    pub fn listeners(&self, name: &str) -> Vec<Listener> {
        self.write().store.get(name)
    }

    /// Listeners whose wildcard-tree registration path matches `pattern`.
    ///
    /// `pattern` may use `*` as a full segment to match every child at that
    /// level. Outside wildcard mode, or for names that never entered the
    /// tree, the result is empty. Overlapping matched paths may yield the
    /// same listener more than once. This is pure introspection; it performs
    /// no dispatch.
    #[must_use]
    pub fn listeners_matching(&self, pattern: &str) -> Vec<Listener> {
        let state = self.read();
        match state.tree.as_ref() {
            Some(tree) => tree.search(pattern, &state.config.delimiter),
            None => Vec::new(),
        }
    }

    /// Change the leak-warning threshold. `0` disables the warning.
    pub fn set_max_listeners(&self, n: usize) {
        self.write().config.max_listeners = n;
    }

    /// Snapshot of the current configuration.
    #[must_use]
    pub fn config(&self) -> EmitterConfig {
        self.read().config.clone()
    }

    fn register(&self, name: &str, entry: Entry) -> Result<(), EmitterError> {
        self.emit(NEW_LISTENER, vec![Value::String(name.to_owned())])?;

        let (verbose, wants_tree) = {
            let state = self.read();
            (
                state.config.verbose,
                state.tree.is_some() && name.contains(state.config.delimiter.as_str()),
            )
        };

        if wants_tree {
            self.grow_tree(name, &entry)?;
        }

        {
            let mut state = self.write();
            let max = state.config.max_listeners;
            state.store.add(name, entry, max);
        }

        if verbose {
            debug!(event = name, "listener registered");
        } else {
            trace!(event = name, "listener registered");
        }
        Ok(())
    }

    fn grow_tree(&self, name: &str, entry: &Entry) -> Result<(), EmitterError> {
        let malformed = {
            let state = self.read();
            let delimiter = state.config.delimiter.as_str();
            name.starts_with(delimiter) || name.ends_with(delimiter)
        };
        if malformed {
            // Reported through the error event rather than returned
            // directly; the name never gains a terminal tree entry.
            self.emit(
                ERROR_EVENT,
                vec![Value::String(format!("bad event name: {name}"))],
            )?;
            return Ok(());
        }

        let mut state = self.write();
        let max = state.config.max_listeners;
        let delimiter = state.config.delimiter.clone();
        if let Some(tree) = state.tree.as_mut() {
            tree.insert(name, &delimiter, entry.clone(), max);
        }
        Ok(())
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

fn unhandled_error(payload: Option<&Value>) -> EmitterError {
    match payload {
        Some(value) if is_error_like(value) => EmitterError::UnhandledError(value.clone()),
        _ => EmitterError::UncaughtError,
    }
}

/// An error-like payload mirrors a thrown exception value: an object
/// carrying a `message` field.
fn is_error_like(value: &Value) -> bool {
    value.as_object().is_some_and(|map| map.contains_key("message"))
}

/// Counting delegate created by [`Emitter::many`] and [`Emitter::once`].
///
/// Holds the emitter's shared state weakly so a pending delegate never keeps
/// the registries alive on its own.
struct TtlDelegate {
    event: String,
    remaining: AtomicUsize,
    target: Listener,
    emitter: Weak<Shared>,
    weak_self: Weak<TtlDelegate>,
}

impl TtlDelegate {
    fn new(event: &str, count: usize, target: Listener, emitter: Weak<Shared>) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            event: event.to_owned(),
            remaining: AtomicUsize::new(count),
            target,
            emitter,
            weak_self: weak_self.clone(),
        })
    }
}

impl Handler for TtlDelegate {
    fn call(&self, event: &Event) {
        let previous = self.remaining.fetch_sub(1, Ordering::SeqCst);
        if previous == 0 {
            // Already expired; an in-flight snapshot may still reach us, but
            // the target must not run again.
            self.remaining.store(0, Ordering::SeqCst);
            return;
        }
        if previous == 1 {
            // Unregister by our own delegate identity before invoking the
            // target, so recursive emission from the target cannot re-enter.
            if let (Some(shared), Some(me)) = (self.emitter.upgrade(), self.weak_self.upgrade()) {
                let callable: Listener = me;
                Emitter::from_shared(shared).un(&self.event, &callable);
            }
        }
        self.target.call(event);
    }
}
