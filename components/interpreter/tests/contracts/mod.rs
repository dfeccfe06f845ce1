//! Contract tests for the engine's embedding API
//!
//! These tests pin down the guarantees embedders rely on: rooting, host data
//! finalization, deferred collection and termination.

use core_types::{ErrorKind, Value};
use interpreter::{EngineFlags, Exception, VM};
use std::cell::Cell;
use std::rc::Rc;

struct DropFlag(Rc<Cell<bool>>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

/// Contract: a rooted object survives collection until its root is released
#[test]
fn test_root_keeps_object_alive() {
    let vm = VM::new();
    let object = vm.new_object();
    let root = vm.add_root(Value::HeapObject(object));
    assert!(vm.collect_garbage());
    assert!(vm.heap().is_valid(object));
    assert_eq!(vm.get_root(root), Some(Value::HeapObject(object)));

    vm.release_root(root);
    vm.collect_garbage();
    assert!(!vm.heap().is_valid(object));
}

/// Contract: host data of a swept object is dropped by the collection
#[test]
fn test_host_data_dropped_with_object() {
    let vm = VM::new();
    let dropped = Rc::new(Cell::new(false));
    let object = vm.new_object();
    assert!(vm.set_host_data(object, Box::new(DropFlag(dropped.clone()))));
    assert_eq!(vm.with_host_data::<DropFlag, _>(object, |_| 1), Some(1));

    vm.collect_garbage();
    assert!(dropped.get());
}

/// Contract: objects reachable from the global object are never swept
#[test]
fn test_global_reachability() {
    let vm = VM::new();
    vm.eval("var keep = {nested: [1, 2, 3]};", "test").unwrap();
    vm.collect_garbage();
    assert_eq!(vm.eval("keep.nested[2]", "test").unwrap(), Value::Smi(3));
}

/// Contract: collection requested while script runs is deferred
#[test]
fn test_collection_deferred_while_running() {
    let vm = VM::new();
    let observed = Rc::new(Cell::new(true));
    let seen = observed.clone();
    let probe = vm.create_native_function("probe", move |vm, _| {
        seen.set(vm.collect_garbage());
        Ok(Value::Undefined)
    });
    vm.define_own(vm.global_object(), "probe", Value::HeapObject(probe), false);
    let before = vm.gc_stats().collections;
    vm.eval("probe()", "test").unwrap();
    assert!(!observed.get());
    assert_eq!(vm.gc_stats().collections, before + 1);
}

/// Contract: an open handle scope keeps unrooted objects across entry points
#[test]
fn test_handle_scope_defers_collection() {
    let vm = VM::new();
    let scope = vm.handle_scope();
    let object = vm.new_object();
    assert!(!vm.collect_garbage());
    vm.eval("1 + 1", "test").unwrap();
    assert!(vm.heap().is_valid(object));
    drop(scope);
    assert!(vm.collect_garbage());
    assert!(!vm.heap().is_valid(object));
}

/// Contract: releasing a root while the heap is borrowed is applied later
#[test]
fn test_release_root_while_borrowed() {
    let vm = VM::new();
    let root = vm.add_root(Value::Smi(1));
    let count = vm.heap().root_count();
    {
        let _borrowed = vm.heap();
        vm.release_root(root);
    }
    assert_eq!(vm.heap().root_count(), count);
    vm.collect_garbage();
    assert_eq!(vm.heap().root_count(), count - 1);
}

/// Contract: identity hashes are stable for the lifetime of an object
#[test]
fn test_identity_hash_stable() {
    let vm = VM::new();
    let object = vm.new_object();
    let root = vm.add_root(Value::HeapObject(object));
    let hash = vm.identity_hash(object);
    vm.collect_garbage();
    assert_eq!(vm.identity_hash(object), hash);
    vm.release_root(root);
}

/// Contract: termination is not catchable by script
#[test]
fn test_termination_skips_catch() {
    let vm = VM::new();
    vm.interrupt_handle().interrupt();
    let err = vm
        .eval("var caught = false; try { while (true) {} } catch (e) { caught = true }", "test")
        .unwrap_err();
    assert!(err.is_termination());
    vm.reset_interrupt();
    assert_eq!(vm.eval("caught", "test").unwrap(), Value::Boolean(false));
}

/// Contract: exceeding the stack limit throws a catchable RangeError
#[test]
fn test_stack_limit() {
    let vm = VM::with_flags(EngineFlags::parse("--stack-limit=16"));
    let err = vm.eval("function r() { return r() } r()", "test").unwrap_err();
    let described = vm.describe_exception(&err);
    assert_eq!(described.kind, ErrorKind::RangeError);
    assert_eq!(described.message, "Maximum call stack size exceeded");
    assert_eq!(vm.stack_depth(), 0);
}

/// Contract: --expose-gc installs a global gc function
#[test]
fn test_expose_gc_flag() {
    let vm = VM::new();
    assert_eq!(vm.eval("typeof gc", "test").unwrap(), Value::String("undefined".into()));
    vm.set_flags_from_string("--expose-gc");
    assert_eq!(vm.eval("typeof gc", "test").unwrap(), Value::String("function".into()));
}

/// Contract: described exceptions carry kind, message, origin and line
#[test]
fn test_describe_exception() {
    let vm = VM::new();
    let err = vm.eval("\n\nthrow new TypeError('nope')", "script.js").unwrap_err();
    let described = vm.describe_exception(&err);
    assert_eq!(described.to_string(), "TypeError: nope at script.js:3");
    assert!(matches!(err, Exception::Thrown { .. }));
}

/// Contract: idle notification settles once nothing is left to free
#[test]
fn test_idle_notification_settles() {
    let vm = VM::new();
    vm.eval("for (var i = 0; i < 100; i++) { [i] }", "test").unwrap();
    let mut rounds = 0;
    while !vm.idle_notification() {
        rounds += 1;
        assert!(rounds < 10);
    }
}

/// Contract: call and construct work on script functions from the embedder
#[test]
fn test_call_and_construct() {
    let vm = VM::new();
    vm.eval("function Pair(a, b) { this.a = a; this.b = b } function add(a, b) { return a + b }", "test")
        .unwrap();
    let global = Value::HeapObject(vm.global_object());
    let add = vm.get_property(&global, "add").unwrap();
    assert_eq!(
        vm.call(&add, &Value::Undefined, &[Value::Smi(2), Value::Smi(3)]).unwrap(),
        Value::Smi(5)
    );
    let pair = vm.get_property(&global, "Pair").unwrap();
    let instance = vm.construct(&pair, &[Value::Smi(1), Value::Smi(2)]).unwrap();
    assert_eq!(vm.get_property(&instance, "b").unwrap(), Value::Smi(2));
    assert_eq!(vm.own_enumerable_keys(instance.as_object().unwrap()), vec!["a", "b"]);
}

/// Contract: calling a non-callable value from the embedder is a TypeError
#[test]
fn test_call_non_function() {
    let vm = VM::new();
    let err = vm.call(&Value::Smi(3), &Value::Undefined, &[]).unwrap_err();
    let described = vm.describe_exception(&err);
    assert_eq!(described.kind, ErrorKind::TypeError);
    assert_eq!(described.message, "3 is not a function");
}

/// Contract: embedder reads of object properties see inherited values
#[test]
fn test_object_property_reads_prototypes() {
    let vm = VM::new();
    let object = vm
        .eval("var base = { k: 1 }; var o = Object.create(base); o.own = 2; o", "test")
        .unwrap();
    let id = object.as_object().unwrap();
    assert_eq!(vm.object_property(id, "own"), Value::Smi(2));
    assert_eq!(vm.object_property(id, "k"), Value::Smi(1));
    assert_eq!(vm.object_property(id, "missing"), Value::Undefined);
}
