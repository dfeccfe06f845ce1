//! The guest heap.
//!
//! A non-moving mark/sweep heap. Cells live in a vector of slots; handles
//! carry the slot index and the slot's generation, which is bumped whenever a
//! slot is freed so stale handles are detected rather than silently aliasing a
//! newer allocation.
//!
//! Objects may carry one piece of embedder data (`host_data`). When such an
//! object is swept its data is handed back from [`Heap::collect_garbage`]
//! instead of being dropped in place, so the embedder can run finalizers
//! without the heap being borrowed.

use crate::gc::{GcStats, Tracer};
use crate::handle::RootId;
use crate::object::{JsObject, Scope};
use core_types::{ObjectId, Value};
use std::any::Any;

/// Identity hashes are confined to 30 bits.
pub const DEFAULT_IDENTITY_HASH_MASK: u32 = 0x3fff_ffff;

pub(crate) enum HeapCell {
    Object(JsObject),
    Scope(Scope),
}

pub(crate) struct Slot {
    pub(crate) cell: Option<HeapCell>,
    pub(crate) generation: u32,
}

/// Garbage-collected storage for guest objects and scopes.
pub struct Heap {
    slots: Vec<Slot>,
    marks: Vec<bool>,
    free_list: Vec<u32>,
    roots: Vec<Option<Value>>,
    roots_free: Vec<u32>,
    hash_state: u64,
    hash_mask: u32,
    stats: GcStats,
}

impl Heap {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            marks: Vec::new(),
            free_list: Vec::new(),
            roots: Vec::new(),
            roots_free: Vec::new(),
            hash_state: 0x9e37_79b9_7f4a_7c15,
            hash_mask: DEFAULT_IDENTITY_HASH_MASK,
            stats: GcStats::default(),
        }
    }

    /// Restricts identity hashes to `mask`. Narrow masks force collisions,
    /// which embedders use to exercise their bucket handling.
    pub fn set_identity_hash_mask(&mut self, mask: u32) {
        self.hash_mask = mask;
    }

    fn next_identity_hash(&mut self) -> u32 {
        // splitmix64
        self.hash_state = self.hash_state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.hash_state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        (z as u32) & self.hash_mask
    }

    fn insert(&mut self, cell: HeapCell) -> ObjectId {
        self.stats.allocations_since_gc += 1;
        self.stats.live_cells += 1;
        match self.free_list.pop() {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                slot.cell = Some(cell);
                ObjectId::new(idx, slot.generation)
            }
            None => {
                let idx = self.slots.len() as u32;
                self.slots.push(Slot {
                    cell: Some(cell),
                    generation: 0,
                });
                self.marks.push(false);
                ObjectId::new(idx, 0)
            }
        }
    }

    /// Allocates an object and assigns its identity hash.
    pub fn allocate(&mut self, mut object: JsObject) -> ObjectId {
        object.identity_hash = self.next_identity_hash();
        self.insert(HeapCell::Object(object))
    }

    /// Allocates a scope record.
    pub fn allocate_scope(&mut self, scope: Scope) -> ObjectId {
        self.insert(HeapCell::Scope(scope))
    }

    fn cell(&self, id: ObjectId) -> Option<&HeapCell> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.cell.as_ref()
    }

    fn cell_mut(&mut self, id: ObjectId) -> Option<&mut HeapCell> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.cell.as_mut()
    }

    /// Whether `id` still names a live cell.
    pub fn is_valid(&self, id: ObjectId) -> bool {
        self.cell(id).is_some()
    }

    /// Borrows a live object.
    pub fn get(&self, id: ObjectId) -> Option<&JsObject> {
        match self.cell(id)? {
            HeapCell::Object(obj) => Some(obj),
            HeapCell::Scope(_) => None,
        }
    }

    /// Mutably borrows a live object.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut JsObject> {
        match self.cell_mut(id)? {
            HeapCell::Object(obj) => Some(obj),
            HeapCell::Scope(_) => None,
        }
    }

    /// Borrows a live scope.
    pub fn scope(&self, id: ObjectId) -> Option<&Scope> {
        match self.cell(id)? {
            HeapCell::Scope(scope) => Some(scope),
            HeapCell::Object(_) => None,
        }
    }

    /// Mutably borrows a live scope.
    pub fn scope_mut(&mut self, id: ObjectId) -> Option<&mut Scope> {
        match self.cell_mut(id)? {
            HeapCell::Scope(scope) => Some(scope),
            HeapCell::Object(_) => None,
        }
    }

    /// The identity hash of a live object.
    pub fn identity_hash(&self, id: ObjectId) -> Option<u32> {
        self.get(id).map(|obj| obj.identity_hash)
    }

    /// Attaches embedder data to an object, replacing any previous data.
    ///
    /// The data is handed back when the object is dead.
    pub fn set_host_data(&mut self, id: ObjectId, data: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        match self.get_mut(id) {
            Some(obj) => {
                obj.host_data = Some(data);
                Ok(())
            }
            None => Err(data),
        }
    }

    /// Borrows an object's embedder data.
    pub fn host_data(&self, id: ObjectId) -> Option<&dyn Any> {
        self.get(id)?.host_data.as_deref()
    }

    /// Detaches an object's embedder data.
    pub fn take_host_data(&mut self, id: ObjectId) -> Option<Box<dyn Any>> {
        self.get_mut(id)?.host_data.take()
    }

    /// Adds a persistent root, keeping `value` alive until the returned
    /// [`RootId`] is removed.
    pub fn add_root(&mut self, value: Value) -> RootId {
        let idx = match self.roots_free.pop() {
            Some(idx) => idx as usize,
            None => {
                self.roots.push(None);
                self.roots.len() - 1
            }
        };
        self.roots[idx] = Some(value);
        RootId(idx as u32)
    }

    /// Returns the current value of a persistent root.
    pub fn get_root(&self, id: RootId) -> Option<Value> {
        self.roots.get(id.0 as usize).and_then(|slot| slot.clone())
    }

    /// Replaces a root's value. Removed roots are left alone.
    pub fn set_root(&mut self, id: RootId, value: Value) {
        if let Some(slot) = self.roots.get_mut(id.0 as usize) {
            if slot.is_some() {
                *slot = Some(value);
            }
        }
    }

    /// Removes a persistent root.
    pub fn remove_root(&mut self, id: RootId) {
        if let Some(slot) = self.roots.get_mut(id.0 as usize) {
            if slot.take().is_some() {
                self.roots_free.push(id.0);
            }
        }
    }

    /// Number of live persistent roots.
    pub fn root_count(&self) -> usize {
        self.roots.len() - self.roots_free.len()
    }

    /// Adjusts the external memory counter and returns the new total.
    pub fn adjust_external_memory(&mut self, delta: i64) -> i64 {
        self.stats.external_memory = self.stats.external_memory.saturating_add(delta);
        self.stats.external_memory
    }

    /// Collector statistics.
    pub fn stats(&self) -> GcStats {
        self.stats
    }

    /// Runs a full collection.
    ///
    /// `extra_roots` are treated as live in addition to persistent roots.
    /// Returns the embedder data of every swept object; dropping it is the
    /// caller's job.
    pub fn collect_garbage(&mut self, extra_roots: &[Value]) -> Vec<Box<dyn Any>> {
        {
            let mut tracer = Tracer::new(&self.slots, &mut self.marks);
            for value in self.roots.iter().flatten() {
                tracer.trace_value(value);
            }
            for value in extra_roots {
                tracer.trace_value(value);
            }
            tracer.run();
        }

        let mut finalized = Vec::new();
        let mut freed = 0;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let marked = std::mem::replace(&mut self.marks[idx], false);
            if marked || slot.cell.is_none() {
                continue;
            }
            if let Some(HeapCell::Object(mut obj)) = slot.cell.take() {
                if let Some(data) = obj.host_data.take() {
                    finalized.push(data);
                }
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(idx as u32);
            freed += 1;
        }

        self.stats.collections += 1;
        self.stats.live_cells -= freed;
        self.stats.last_freed = freed;
        self.stats.allocations_since_gc = 0;
        tracing::debug!(
            freed,
            live = self.stats.live_cells,
            finalizers = finalized.len(),
            "guest heap collected"
        );
        finalized
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
