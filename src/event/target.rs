use serde::{Deserialize, Serialize};
use std::fmt;

/// Default target identity: the address of a live subscriber
///
/// Registering with `TargetId::of(self)` lets a subscriber be addressed
/// individually and later unsubscribed from every event at once. Subscribers
/// that never need addressing can share [`TargetId::ANONYMOUS`].
///
/// The id is only meaningful while the subscriber stays where it is; moving or
/// dropping it and registering again yields a different id. Zero-sized
/// subscribers may share an address.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TargetId(usize);

impl TargetId {
    /// Sentinel for registrations that don't need individual addressing
    pub const ANONYMOUS: TargetId = TargetId(0);

    pub fn of<S: ?Sized>(subscriber: &S) -> Self {
        TargetId(subscriber as *const S as *const () as usize)
    }

    pub const fn from_raw(raw: usize) -> Self {
        TargetId(raw)
    }

    pub fn as_raw(&self) -> usize {
        self.0
    }

    pub fn is_anonymous(&self) -> bool {
        *self == Self::ANONYMOUS
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            write!(f, "anonymous")
        } else {
            write!(f, "target#{:#x}", self.0)
        }
    }
}
