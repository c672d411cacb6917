use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::rc::Rc;
use tracing::{debug, trace, warn};

use super::{
    config::MismatchPolicy,
    error::DispatchError,
    listener::{AnyListener, Listener, MutListener, RefListener, Signature},
};

type SharedListener = Rc<RefCell<Box<dyn AnyListener>>>;

/// Which slots a delivery should reach
enum Route<'a, T> {
    Broadcast,
    Unicast(&'a T),
}

/// One target's listener, with its signature kept outside the cell so it can
/// be checked while the listener itself is running
#[derive(Clone)]
struct Slot {
    signature: Signature,
    listener: SharedListener,
}

impl Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("signature", &self.signature)
            .finish()
    }
}

/// Listener slots registered under one event name
///
/// Each target owns at most one slot. Registering again at an occupied slot
/// drops the previous listener. Slots are kept in a hash map, so broadcast
/// order across targets is unspecified.
///
/// Every method takes `&self`, and a dispatch snapshots the matching slots
/// before invoking any of them. Handlers may therefore register, unregister
/// or dispatch on the same event while it is delivering; such changes apply
/// from the next dispatch on. A handler that is already running is not
/// invoked again by a nested dispatch.
pub struct Event<T> {
    label: String,
    policy: Cell<MismatchPolicy>,
    listeners: RefCell<HashMap<T, Slot>>,
}

impl<T> Event<T>
where
    T: Eq + Hash + Debug,
{
    /// Creates an empty event; `label` only shows up in logs and errors
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            policy: Cell::new(MismatchPolicy::default()),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Set how signature mismatches are treated by this event
    pub fn with_policy(self, policy: MismatchPolicy) -> Self {
        self.policy.set(policy);
        self
    }

    pub(crate) fn set_policy(&self, policy: MismatchPolicy) {
        self.policy.set(policy);
    }

    /// Name this event was created under, as shown in logs and errors
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current mismatch policy
    pub fn policy(&self) -> MismatchPolicy {
        self.policy.get()
    }

    /// Register a handler taking its arguments by value at `target`
    pub fn register_handler<A: 'static>(&self, handler: impl FnMut(A) + 'static, target: T) {
        self.register_listener(Box::new(Listener::new(handler)), target);
    }

    /// Register a handler borrowing its arguments at `target`
    pub fn register_ref_handler<A: 'static>(&self, handler: impl FnMut(&A) + 'static, target: T) {
        self.register_listener(Box::new(RefListener::new(handler)), target);
    }

    /// Register a handler mutating its arguments in place at `target`
    pub fn register_mut_handler<A: 'static>(
        &self,
        handler: impl FnMut(&mut A) + 'static,
        target: T,
    ) {
        self.register_listener(Box::new(MutListener::new(handler)), target);
    }

    /// Stores an already built listener at `target`, replacing any previous one
    pub fn register_listener(&self, listener: Box<dyn AnyListener>, target: T) {
        let signature = listener.signature();
        debug!(
            event = %self.label,
            target = ?target,
            signature = %signature,
            "Registering listener"
        );

        let slot = Slot {
            signature,
            listener: Rc::new(RefCell::new(listener)),
        };
        // The replaced listener is dropped after the map borrow ends
        let previous = self.listeners.borrow_mut().insert(target, slot);
        if let Some(previous) = previous {
            debug!(
                event = %self.label,
                previous_signature = %previous.signature,
                "Replaced existing listener"
            );
        }
    }

    /// Removes the slot for `target`, returning whether one existed
    pub fn unregister_target(&self, target: &T) -> bool {
        let removed = self.listeners.borrow_mut().remove(target);
        if removed.is_some() {
            debug!(event = %self.label, target = ?target, "Unregistered target");
        }
        removed.is_some()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Whether no target is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Whether `target` has an occupied slot
    pub fn contains_target(&self, target: &T) -> bool {
        self.listeners.borrow().contains_key(target)
    }

    /// Signature registered at `target`, if any
    pub fn signature_of(&self, target: &T) -> Option<Signature> {
        self.listeners.borrow().get(target).map(|slot| slot.signature)
    }

    /// Targets with an occupied slot, in no particular order
    pub fn targets(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.listeners.borrow().keys().cloned().collect()
    }

    /// Invokes every by-value listener for `A`, each with its own clone of `args`
    pub fn broadcast<A: Clone + 'static>(&self, args: A) -> Result<(), DispatchError> {
        self.deliver::<Listener<A>>(Route::Broadcast, |listener| {
            listener.invoke(args.clone())
        })
    }

    /// Invokes every `&A` listener with a borrow of `args`
    pub fn broadcast_ref<A: 'static>(&self, args: &A) -> Result<(), DispatchError> {
        self.deliver::<RefListener<A>>(Route::Broadcast, |listener| listener.invoke(args))
    }

    /// Invokes every `&mut A` listener in turn; later listeners see earlier mutations
    pub fn broadcast_mut<A: 'static>(&self, args: &mut A) -> Result<(), DispatchError> {
        self.deliver::<MutListener<A>>(Route::Broadcast, |listener| {
            listener.invoke(&mut *args)
        })
    }

    /// Hands `args` to the by-value listener at `target`, if it takes `A`
    pub fn unicast<A: 'static>(&self, target: &T, args: A) -> Result<(), DispatchError> {
        let mut args = Some(args);
        self.deliver::<Listener<A>>(Route::Unicast(target), |listener| {
            if let Some(args) = args.take() {
                listener.invoke(args);
            }
        })
    }

    /// Lends `args` to the `&A` listener at `target`
    pub fn unicast_ref<A: 'static>(&self, target: &T, args: &A) -> Result<(), DispatchError> {
        self.deliver::<RefListener<A>>(Route::Unicast(target), |listener| listener.invoke(args))
    }

    /// Lends `args` mutably to the `&mut A` listener at `target`
    pub fn unicast_mut<A: 'static>(&self, target: &T, args: &mut A) -> Result<(), DispatchError> {
        self.deliver::<MutListener<A>>(Route::Unicast(target), |listener| {
            listener.invoke(&mut *args)
        })
    }

    /// Hands every routed slot whose signature matches `L` to `call`
    ///
    /// Mismatched slots are handled per the event's policy. Under
    /// [`MismatchPolicy::Strict`] all routed slots are checked before anything
    /// is invoked, so a refused dispatch runs no handler at all.
    fn deliver<L: AnyListener>(
        &self,
        route: Route<'_, T>,
        mut call: impl FnMut(&mut L),
    ) -> Result<(), DispatchError> {
        let dispatched = L::expected_signature();
        let policy = self.policy.get();

        if policy == MismatchPolicy::Strict {
            self.check_route(&route, dispatched)?;
        }

        let matching = self.snapshot(&route, dispatched, policy);
        let mut delivered = 0usize;
        for listener in &matching {
            let Ok(mut listener) = listener.try_borrow_mut() else {
                trace!(event = %self.label, "Listener already running, skipping nested delivery");
                continue;
            };
            if let Some(listener) = listener.downcast_mut::<L>() {
                call(listener);
                delivered += 1;
            }
        }

        trace!(
            event = %self.label,
            signature = %dispatched,
            delivered,
            "Delivery complete"
        );
        Ok(())
    }

    /// Collects the routed listeners matching `dispatched`, logging the rest
    fn snapshot(
        &self,
        route: &Route<'_, T>,
        dispatched: Signature,
        policy: MismatchPolicy,
    ) -> Vec<SharedListener> {
        let listeners = self.listeners.borrow();
        let mut matching = Vec::new();
        let mut consider = |target: &T, slot: &Slot| {
            if slot.signature == dispatched {
                matching.push(slot.listener.clone());
            } else {
                log_skip(&self.label, policy, target, slot.signature, dispatched);
            }
        };

        match route {
            Route::Broadcast => {
                for (target, slot) in listeners.iter() {
                    consider(target, slot);
                }
            }
            Route::Unicast(target) => match listeners.get_key_value(*target) {
                Some((target, slot)) => consider(target, slot),
                None => trace!(event = %self.label, target = ?target, "No listener for target"),
            },
        }

        matching
    }

    fn check_route(&self, route: &Route<'_, T>, dispatched: Signature) -> Result<(), DispatchError> {
        let listeners = self.listeners.borrow();
        let mismatch = match route {
            Route::Broadcast => listeners
                .iter()
                .find(|(_, slot)| slot.signature != dispatched),
            Route::Unicast(target) => listeners
                .get_key_value(*target)
                .filter(|(_, slot)| slot.signature != dispatched),
        };

        match mismatch {
            Some((target, slot)) => {
                warn!(
                    event = %self.label,
                    target = ?target,
                    registered = %slot.signature,
                    dispatched = %dispatched,
                    "Refusing dispatch with mismatched signature"
                );
                Err(DispatchError::signature_mismatch(
                    &self.label,
                    target,
                    slot.signature.name(),
                    dispatched.name(),
                ))
            }
            None => Ok(()),
        }
    }
}

fn log_skip<T: Debug>(
    event: &str,
    policy: MismatchPolicy,
    target: &T,
    registered: Signature,
    dispatched: Signature,
) {
    match policy {
        MismatchPolicy::Warn => warn!(
            event = %event,
            target = ?target,
            registered = %registered,
            dispatched = %dispatched,
            "Skipping listener with mismatched signature"
        ),
        _ => trace!(
            event = %event,
            target = ?target,
            registered = %registered,
            dispatched = %dispatched,
            "Skipping listener with mismatched signature"
        ),
    }
}

impl<T: Debug> Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("label", &self.label)
            .field("policy", &self.policy.get())
            .field("listeners", &self.listeners)
            .finish()
    }
}
