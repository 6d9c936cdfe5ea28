//! Module handles and endpoint addresses.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::module::Module;

/// Unique identifier for a module registered with a [`Graph`](crate::Graph).
///
/// Module IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

/// Unique identifier for an edge.
///
/// Edge IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// One endpoint of one module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port {
    /// Owning module.
    pub module: ModuleId,
    /// Index into the module's endpoint table.
    pub index: usize,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.module, self.index)
    }
}

/// Strong handle to a module owned by the caller.
///
/// The graph only keeps a weak reference: once every `Node` clone is dropped,
/// the module is gone and the graph forgets its edges the next time it
/// touches them.
pub struct Node<M: ?Sized> {
    id: ModuleId,
    inner: Rc<RefCell<M>>,
}

impl<M: Module> Node<M> {
    pub(crate) fn new(id: ModuleId, inner: Rc<RefCell<M>>) -> Self {
        Self { id, inner }
    }

    /// Graph identifier.
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Address of endpoint `endpoint`, by index or port enum.
    pub fn port(&self, endpoint: impl Into<usize>) -> Port {
        Port {
            module: self.id,
            index: endpoint.into(),
        }
    }

    /// Shared access to the module, e.g. for typed getters.
    ///
    /// # Panics
    ///
    /// If the module is currently borrowed mutably.
    pub fn borrow(&self) -> Ref<'_, M> {
        self.inner.borrow()
    }

    /// Exclusive access to the module.
    ///
    /// Changes made through this handle bypass the graph; call
    /// [`Graph::refresh`](crate::Graph::refresh) afterwards so cached outputs
    /// and downstream modules catch up.
    ///
    /// # Panics
    ///
    /// If the module is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, M> {
        self.inner.borrow_mut()
    }
}

impl<M: ?Sized> Clone for Node<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M: ?Sized> fmt::Debug for Node<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("id", &self.id).finish_non_exhaustive()
    }
}
