//! Mark phase of the non-moving mark/sweep collector.
//!
//! Marking walks everything reachable from the root set with an explicit
//! work list, so deep object graphs never recurse on the native stack.

use crate::heap::{HeapCell, Slot};
use core_types::{ObjectId, Value};

/// Counters describing the collector's work so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Completed collections
    pub collections: u64,
    /// Objects and scopes currently allocated
    pub live_cells: usize,
    /// Cells freed by the most recent collection
    pub last_freed: usize,
    /// Allocations since the most recent collection
    pub allocations_since_gc: usize,
    /// Bytes of host memory attributed to guest objects
    pub external_memory: i64,
}

pub(crate) struct Tracer<'a> {
    slots: &'a [Slot],
    marks: &'a mut [bool],
    work: Vec<ObjectId>,
}

impl<'a> Tracer<'a> {
    pub(crate) fn new(slots: &'a [Slot], marks: &'a mut [bool]) -> Self {
        Self {
            slots,
            marks,
            work: Vec::new(),
        }
    }

    pub(crate) fn trace_value(&mut self, value: &Value) {
        if let Value::HeapObject(id) = value {
            self.work.push(*id);
        }
    }

    pub(crate) fn trace_id(&mut self, id: ObjectId) {
        self.work.push(id);
    }

    pub(crate) fn run(&mut self) {
        let slots = self.slots;
        while let Some(id) = self.work.pop() {
            let idx = id.index() as usize;
            let Some(slot) = slots.get(idx) else {
                continue;
            };
            if slot.generation != id.generation() || self.marks[idx] {
                continue;
            }
            let Some(cell) = slot.cell.as_ref() else {
                continue;
            };
            self.marks[idx] = true;
            match cell {
                HeapCell::Object(obj) => {
                    if let Some(proto) = obj.prototype {
                        self.work.push(proto);
                    }
                    for (_, prop) in obj.properties.iter() {
                        if let Value::HeapObject(child) = prop.value {
                            self.work.push(child);
                        }
                    }
                    for value in &obj.internal_slots {
                        self.trace_value(value);
                    }
                    if let Some(elements) = obj.elements() {
                        for value in elements {
                            self.trace_value(value);
                        }
                    }
                    if let Some(scope) = obj.function().and_then(|f| f.scope) {
                        self.work.push(scope);
                    }
                }
                HeapCell::Scope(scope) => {
                    if let Some(parent) = scope.parent {
                        self.work.push(parent);
                    }
                    for binding in scope.bindings.values() {
                        self.trace_value(&binding.value);
                    }
                }
            }
        }
    }
}
