//! In-process typed event dispatch
//!
//! A [`Dispatcher`] maps event names to [`Event`]s, and each event maps target
//! identities to one type-erased listener. Publishers broadcast to every
//! target of a name or unicast to a single target; listeners whose argument
//! shape doesn't match the dispatched arguments are skipped.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use typed_events::{Dispatcher, TargetId};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let dispatcher: Dispatcher<String> = Dispatcher::new();
//!
//! let sink = seen.clone();
//! dispatcher.register_event("t1", TargetId::ANONYMOUS, move |value: i32| {
//!     sink.borrow_mut().push(value)
//! });
//!
//! dispatcher.dispatch("t1", 1i32).unwrap();
//! // Wrong argument type: nothing runs, nothing fails
//! dispatcher.dispatch("t1", "hello").unwrap();
//!
//! assert_eq!(*seen.borrow(), vec![1]);
//! ```

pub mod event;

// Re-export commonly used types for easier access
pub use event::{
    AnyListener, DispatchError, Dispatcher, DispatcherConfig, Event, Listener, MismatchPolicy,
    MutListener, RefListener, Signature, TargetId,
};
