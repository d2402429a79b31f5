use std::fmt;
use std::marker::PhantomData;

/// Index of a wire in the circuit arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(pub(crate) usize);

/// Index of a connector (component terminal) in the circuit arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectorId(pub(crate) usize);

/// Index of a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) usize);

/// Index of an external signal observer registered with `Circuit::probe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeId(pub(crate) usize);

impl WireId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl ConnectorId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl ComponentId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wire{}", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Typed component handle.
///
/// Returned by `Circuit::add`; remembers the concrete component type so
/// device-specific operations (memory programming, switch toggling, clock
/// control) can be exposed as methods on the handle itself.
pub struct Handle<T> {
    id: ComponentId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(id: ComponentId) -> Self {
        Handle {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

impl<T> From<Handle<T>> for ComponentId {
    fn from(handle: Handle<T>) -> Self {
        handle.id
    }
}
