//! Memory Manager to Interpreter Integration Tests
//!
//! Verifies that script-created objects are managed by the heap and that
//! embedder roots and host data behave across collections.

use core_types::Value;
use interpreter::{EngineFlags, VM};
use std::cell::Cell;
use std::rc::Rc;

struct Finalized(Rc<Cell<usize>>);

impl Drop for Finalized {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Test: unreachable script objects are reclaimed
#[test]
fn test_script_garbage_is_reclaimed() {
    let vm = VM::new();
    vm.eval("for (var i = 0; i < 100; i++) { var tmp = {i: i}; } tmp = null;", "test")
        .unwrap();
    let before = vm.gc_stats().live_cells;
    while !vm.idle_notification() {}
    assert!(vm.gc_stats().live_cells < before);
}

/// Test: a root keeps a script object alive after the script drops it
#[test]
fn test_root_survives_script_release() {
    let vm = VM::new();
    let object = vm.eval("var keep = {v: 7}; keep", "test").unwrap();
    let root = vm.add_root(object.clone());
    vm.eval("keep = null", "test").unwrap();
    while !vm.idle_notification() {}
    assert_eq!(vm.get_property(&object, "v").unwrap(), Value::Smi(7));
    vm.release_root(root);
}

/// Test: host data of collected objects is finalized exactly once
#[test]
fn test_host_data_finalized_once() {
    let vm = VM::new();
    let count = Rc::new(Cell::new(0));
    for _ in 0..3 {
        let object = vm.new_object();
        vm.set_host_data(object, Box::new(Finalized(count.clone())));
    }
    while !vm.idle_notification() {}
    assert_eq!(count.get(), 3);
    while !vm.idle_notification() {}
    assert_eq!(count.get(), 3);
}

/// Test: the allocation interval triggers collections at entry points
#[test]
fn test_gc_interval_flag() {
    let vm = VM::with_flags(EngineFlags::parse("--gc-interval=50"));
    let before = vm.gc_stats().collections;
    for _ in 0..10 {
        vm.eval("for (var i = 0; i < 20; i++) { ({}); }", "test").unwrap();
    }
    assert!(vm.gc_stats().collections > before);
}
