use std::borrow::Borrow;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

use super::{
    channel::Event,
    config::{DispatcherConfig, MismatchPolicy},
    error::DispatchError,
    listener::AnyListener,
    target::TargetId,
};

/// Routes registrations and dispatches to the event with the matching name
///
/// The Dispatcher is the only entry point subscribers and publishers need:
/// - Subscribers register a handler under `(name, target)`
/// - Publishers broadcast to every target of a name, or unicast to one target
/// - Handlers whose argument shape doesn't match the dispatched arguments are
///   skipped, or reported, depending on the configured [`MismatchPolicy`]
///
/// Events are created on first registration and live as long as the
/// Dispatcher, even once every target has unsubscribed. Dispatching to a name
/// that was never registered does nothing.
///
/// Every call runs synchronously: handlers execute in line before `dispatch*`
/// returns, and a panicking handler unwinds straight out of it, so remaining
/// handlers of that fan-out don't run.
///
/// All methods take `&self`, so a handler holding the dispatcher (typically
/// through a `Weak`) can register, unregister and dispatch from inside a
/// dispatch. Changes to the event currently delivering take effect from its
/// next dispatch.
pub struct Dispatcher<N, T = TargetId> {
    events: RefCell<HashMap<N, Rc<Event<T>>>>,
    config: Cell<DispatcherConfig>,
}

impl<N, T> Default for Dispatcher<N, T>
where
    N: Eq + Hash + Display,
    T: Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, T> Dispatcher<N, T>
where
    N: Eq + Hash + Display,
    T: Eq + Hash + Debug,
{
    /// Create a dispatcher with the default configuration
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Create a dispatcher from an explicit configuration
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            events: RefCell::new(HashMap::new()),
            config: Cell::new(config),
        }
    }

    /// Set how signature mismatches are treated at dispatch time
    pub fn with_mismatch_policy(self, policy: MismatchPolicy) -> Self {
        self.set_mismatch_policy(policy);
        self
    }

    /// Change the mismatch policy, including for events that already exist
    pub fn set_mismatch_policy(&self, policy: MismatchPolicy) {
        debug!(policy = %policy, "Setting mismatch policy");
        self.config
            .set(self.config.get().with_mismatch_policy(policy));
        for event in self.events.borrow().values() {
            event.set_policy(policy);
        }
    }

    /// Current configuration
    pub fn config(&self) -> DispatcherConfig {
        self.config.get()
    }

    /// Register a handler taking its arguments by value
    ///
    /// Use a tuple for several arguments and `()` for none. Each dispatch hands
    /// the handler its own clone of the arguments.
    pub fn register_event<A: 'static>(
        &self,
        name: impl Into<N>,
        target: T,
        handler: impl FnMut(A) + 'static,
    ) {
        self.event_entry(name.into()).register_handler(handler, target);
    }

    /// Register a handler that borrows the dispatched arguments
    pub fn register_event_ref<A: 'static>(
        &self,
        name: impl Into<N>,
        target: T,
        handler: impl FnMut(&A) + 'static,
    ) {
        self.event_entry(name.into()).register_ref_handler(handler, target);
    }

    /// Register a handler that may mutate the dispatched arguments in place
    pub fn register_event_mut<A: 'static>(
        &self,
        name: impl Into<N>,
        target: T,
        handler: impl FnMut(&mut A) + 'static,
    ) {
        self.event_entry(name.into()).register_mut_handler(handler, target);
    }

    /// Register an already built listener
    pub fn register_listener(&self, name: impl Into<N>, target: T, listener: Box<dyn AnyListener>) {
        self.event_entry(name.into()).register_listener(listener, target);
    }

    /// Register a by-value handler at the anonymous target `T::default()`
    pub fn register_anonymous<A: 'static>(
        &self,
        name: impl Into<N>,
        handler: impl FnMut(A) + 'static,
    ) where
        T: Default,
    {
        self.register_event(name, T::default(), handler);
    }

    /// Remove `target` from every event
    #[instrument(level = "debug", skip(self))]
    pub fn unregister_target(&self, target: &T) {
        let removed = self
            .all_events()
            .iter()
            .filter(|event| event.unregister_target(target))
            .count();

        debug!(events = removed, "Target unsubscribed");
    }

    /// Remove `target` from a single event, leaving its other subscriptions alone
    pub fn unregister_event_target<Q>(&self, name: &Q, target: &T) -> bool
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.event(name)
            .is_some_and(|event| event.unregister_target(target))
    }

    /// Broadcast `args` to every by-value listener of `name`
    pub fn dispatch<Q, A>(&self, name: &Q, args: A) -> Result<(), DispatchError>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        A: Clone + 'static,
    {
        match self.event(name) {
            Some(event) => event.broadcast(args),
            None => Self::unknown_event(),
        }
    }

    /// Deliver `args` to the by-value listener `target` registered for `name`
    pub fn dispatch_to<Q, A>(&self, name: &Q, target: &T, args: A) -> Result<(), DispatchError>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        A: 'static,
    {
        match self.event(name) {
            Some(event) => event.unicast(target, args),
            None => Self::unknown_event(),
        }
    }

    /// Broadcast a borrow of `args` to every `&A` listener of `name`
    pub fn dispatch_ref<Q, A>(&self, name: &Q, args: &A) -> Result<(), DispatchError>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        A: 'static,
    {
        match self.event(name) {
            Some(event) => event.broadcast_ref(args),
            None => Self::unknown_event(),
        }
    }

    pub fn dispatch_ref_to<Q, A>(&self, name: &Q, target: &T, args: &A) -> Result<(), DispatchError>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        A: 'static,
    {
        match self.event(name) {
            Some(event) => event.unicast_ref(target, args),
            None => Self::unknown_event(),
        }
    }

    /// Broadcast a mutable borrow of `args`; handlers run one after another and
    /// each sees the mutations of the ones before it
    pub fn dispatch_mut<Q, A>(&self, name: &Q, args: &mut A) -> Result<(), DispatchError>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        A: 'static,
    {
        match self.event(name) {
            Some(event) => event.broadcast_mut(args),
            None => Self::unknown_event(),
        }
    }

    pub fn dispatch_mut_to<Q, A>(
        &self,
        name: &Q,
        target: &T,
        args: &mut A,
    ) -> Result<(), DispatchError>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        A: 'static,
    {
        match self.event(name) {
            Some(event) => event.unicast_mut(target, args),
            None => Self::unknown_event(),
        }
    }

    /// Event registered under `name`, if any
    pub fn event<Q>(&self, name: &Q) -> Option<Rc<Event<T>>>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.events.borrow().get(name).cloned()
    }

    pub fn contains_event<Q>(&self, name: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.events.borrow().contains_key(name)
    }

    /// Number of events ever registered; emptied events still count
    pub fn event_count(&self) -> usize {
        self.events.borrow().len()
    }

    /// Number of targets registered for `name`, zero if it was never registered
    pub fn listener_count<Q>(&self, name: &Q) -> usize
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.event(name).map_or(0, |event| event.len())
    }

    fn all_events(&self) -> Vec<Rc<Event<T>>> {
        self.events.borrow().values().cloned().collect()
    }

    fn event_entry(&self, name: N) -> Rc<Event<T>> {
        let policy = self.config.get().mismatch_policy;
        self.events
            .borrow_mut()
            .entry(name)
            .or_insert_with_key(|name| {
                debug!(event = %name, "Creating event");
                Rc::new(Event::new(name.to_string()).with_policy(policy))
            })
            .clone()
    }

    fn unknown_event() -> Result<(), DispatchError> {
        trace!("Dispatch to unregistered event ignored");
        Ok(())
    }
}

impl<N: Debug, T: Debug> Debug for Dispatcher<N, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("events", &self.events)
            .field("config", &self.config.get())
            .finish()
    }
}
