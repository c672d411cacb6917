// Typed event dispatch
//
// Handlers with different argument shapes live side by side, keyed by event
// name and target. Dispatch recovers each handler's concrete shape through a
// type-tagged downcast and skips the ones that don't match.

// Public API - what other modules can use
pub use channel::Event;
pub use config::{DispatcherConfig, MismatchPolicy};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use listener::{AnyListener, Listener, MutListener, RefListener, Signature};
pub use target::TargetId;

// Internal modules
mod channel;
mod config;
mod dispatcher;
mod error;
mod listener;
mod target;
