//! Heap object handles.

use std::fmt;

/// A handle to an object allocated in the guest heap.
///
/// The handle packs a slot index with the generation the slot had when the
/// object was allocated. Once the slot is swept and reused the generation
/// changes, so stale handles are detected instead of aliasing a new object.
///
/// # Examples
///
/// ```
/// use core_types::ObjectId;
///
/// let id = ObjectId::new(3, 1);
/// assert_eq!(id.index(), 3);
/// assert_eq!(id.generation(), 1);
/// assert_ne!(id, ObjectId::new(3, 2));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Creates a handle from a slot index and generation.
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the heap.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at allocation time.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({}@{})", self.index, self.generation)
    }
}
