use std::cell::RefCell;
use std::rc::Rc;

use typed_events::{Dispatcher, TargetId};

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DataOne(pub i32);

#[derive(Debug, Clone, PartialEq)]
pub struct DataTwo(pub String);

// ============================================================================
// Call recording
// ============================================================================

/// Shared, append-only record of handler invocations
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    /// Calls in invocation order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls sorted, for comparing broadcasts whose order is unspecified
    pub fn sorted(&self) -> Vec<String> {
        let mut calls = self.calls();
        calls.sort();
        calls
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

// ============================================================================
// Observer
// ============================================================================

/// Subscriber addressed by its own identity
pub struct Observer {
    pub name: String,
    log: CallLog,
}

impl Observer {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
        }
    }

    pub fn target(&self) -> TargetId {
        TargetId::of(self)
    }

    /// Subscribes to `t1` with `&DataOne` and `t2` with `&DataTwo`
    ///
    /// The first `t1` registration is replaced by the second one, so only
    /// `on_event_t1` ever fires.
    pub fn register_event_handlers(&self, dispatcher: &Dispatcher<String>) {
        let (name, log) = (self.name.clone(), self.log.clone());
        dispatcher.register_event_ref("t1", self.target(), move |data: &DataOne| {
            log.record(format!("{name}-on_event_t1_ignore: {}", data.0))
        });

        let (name, log) = (self.name.clone(), self.log.clone());
        dispatcher.register_event_ref("t1", self.target(), move |data: &DataOne| {
            log.record(format!("{name}-on_event_t1: {}", data.0))
        });

        let (name, log) = (self.name.clone(), self.log.clone());
        dispatcher.register_event_ref("t2", self.target(), move |data: &DataTwo| {
            log.record(format!("{name}-on_event_t2: {}", data.0))
        });
    }
}
