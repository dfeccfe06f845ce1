//! Root and weak handles into the heap.

use crate::Heap;
use core_types::ObjectId;

/// Identifier of a persistent root created by [`Heap::add_root`].
///
/// A root keeps its value alive across collections until it is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootId(pub(crate) u32);

/// A weak reference to a heap object.
///
/// It does not keep the object alive; [`WeakObject::upgrade`] returns `None`
/// once the object's slot has been swept, even if the slot was reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeakObject(ObjectId);

impl WeakObject {
    /// Creates a weak reference to `id`.
    pub fn new(id: ObjectId) -> Self {
        Self(id)
    }

    /// Returns the object if it is still alive.
    pub fn upgrade(self, heap: &Heap) -> Option<ObjectId> {
        heap.is_valid(self.0).then_some(self.0)
    }

    /// The handle this weak reference was created from.
    pub fn id(self) -> ObjectId {
        self.0
    }
}
