use std::any::{type_name, Any, TypeId};
use std::fmt;

/// Type tag for the argument shape a listener accepts
///
/// The tag is derived from the shape type itself (`A`, `&A` or `&mut A`), so
/// two listeners only compare equal when a caller could hand both of them the
/// exact same arguments.
#[derive(Clone, Copy)]
pub struct Signature {
    id: TypeId,
    name: &'static str,
}

impl Signature {
    /// Tag for handlers taking `S` by value
    pub fn of<S: 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
        }
    }

    /// Tag for handlers taking `&S`
    pub fn of_ref<S: 'static>() -> Self {
        Self::of::<&'static S>()
    }

    /// Tag for handlers taking `&mut S`
    pub fn of_mut<S: 'static>() -> Self {
        Self::of::<&'static mut S>()
    }

    /// Human-readable argument type, for logs and errors only
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Signature {}

impl std::hash::Hash for Signature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.name)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Erased capability shared by every listener
///
/// Events store listeners as `Box<dyn AnyListener>` so handlers with different
/// argument shapes can live in one map. The concrete listener is recovered with
/// [`downcast_mut`](trait.AnyListener.html#method.downcast_mut), which checks
/// the signature tag before handing out a typed reference.
///
/// The trait is sealed: [`Listener`], [`RefListener`] and [`MutListener`] are
/// the only implementations, since dispatch only knows how to invoke those.
///
/// ```compile_fail
/// use std::any::Any;
/// use typed_events::{AnyListener, Signature};
///
/// struct Custom;
///
/// impl AnyListener for Custom {
///     fn expected_signature() -> Signature {
///         Signature::of::<i32>()
///     }
///
///     fn signature(&self) -> Signature {
///         Signature::of::<i32>()
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
/// ```
pub trait AnyListener: Any + sealed::Sealed {
    /// Signature a listener of this concrete type is bound to
    fn expected_signature() -> Signature
    where
        Self: Sized;

    /// Signature of this listener instance
    fn signature(&self) -> Signature;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn AnyListener {
    /// Recovers the concrete listener if its signature matches `L`'s
    ///
    /// Returns `None` on mismatch. Never panics.
    pub fn downcast_mut<L: AnyListener>(&mut self) -> Option<&mut L> {
        if self.signature() != L::expected_signature() {
            return None;
        }
        self.as_any_mut().downcast_mut::<L>()
    }

    /// Whether this listener would accept arguments of shape `L`
    pub fn accepts<L: AnyListener>(&self) -> bool {
        self.signature() == L::expected_signature()
    }
}

impl fmt::Debug for dyn AnyListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyListener")
            .field("signature", &self.signature())
            .finish()
    }
}

/// Listener whose handler receives its arguments by value
pub struct Listener<A: 'static> {
    handler: Box<dyn FnMut(A)>,
}

impl<A: 'static> Listener<A> {
    pub fn new(handler: impl FnMut(A) + 'static) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Calls the handler with `args`
    pub fn invoke(&mut self, args: A) {
        (self.handler)(args)
    }
}

impl<A: 'static> sealed::Sealed for Listener<A> {}

impl<A: 'static> AnyListener for Listener<A> {
    fn expected_signature() -> Signature {
        Signature::of::<A>()
    }

    fn signature(&self) -> Signature {
        Self::expected_signature()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Listener whose handler borrows its arguments
pub struct RefListener<A: 'static> {
    handler: Box<dyn FnMut(&A)>,
}

impl<A: 'static> RefListener<A> {
    pub fn new(handler: impl FnMut(&A) + 'static) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    pub fn invoke(&mut self, args: &A) {
        (self.handler)(args)
    }
}

impl<A: 'static> sealed::Sealed for RefListener<A> {}

impl<A: 'static> AnyListener for RefListener<A> {
    fn expected_signature() -> Signature {
        Signature::of_ref::<A>()
    }

    fn signature(&self) -> Signature {
        Self::expected_signature()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Listener whose handler may mutate the caller's arguments in place
pub struct MutListener<A: 'static> {
    handler: Box<dyn FnMut(&mut A)>,
}

impl<A: 'static> MutListener<A> {
    pub fn new(handler: impl FnMut(&mut A) + 'static) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    pub fn invoke(&mut self, args: &mut A) {
        (self.handler)(args)
    }
}

impl<A: 'static> sealed::Sealed for MutListener<A> {}

impl<A: 'static> AnyListener for MutListener<A> {
    fn expected_signature() -> Signature {
        Signature::of_mut::<A>()
    }

    fn signature(&self) -> Signature {
        Self::expected_signature()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
