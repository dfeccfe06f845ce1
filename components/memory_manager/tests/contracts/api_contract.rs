//! Contract tests verifying the memory_manager API the engine and bridge rely on.

use core_types::Value;
use memory_manager::{
    FunctionCode, FunctionData, Heap, JsObject, ObjectKind, Scope, WeakObject,
};
use std::cell::Cell;
use std::rc::Rc;

fn plain(proto: Option<core_types::ObjectId>) -> JsObject {
    JsObject::new(ObjectKind::Ordinary, proto)
}

struct DropFlag(Rc<Cell<bool>>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

/// Contract: objects reachable through properties, prototypes and array
/// elements survive a collection
#[test]
fn contract_reachability_through_edges() {
    let mut heap = Heap::new();
    let proto = heap.allocate(plain(None));
    let element = heap.allocate(plain(None));
    let child = heap.allocate(plain(Some(proto)));
    let array = heap.allocate(JsObject::new(
        ObjectKind::Array(vec![Value::HeapObject(element)]),
        None,
    ));
    let root = heap.allocate(plain(None));
    let obj = heap.get_mut(root).unwrap();
    obj.properties
        .insert("child".into(), Value::HeapObject(child), true);
    obj.properties
        .insert("list".into(), Value::HeapObject(array), true);

    let _root = heap.add_root(Value::HeapObject(root));
    heap.collect_garbage(&[]);
    for id in [proto, element, child, array, root] {
        assert!(heap.is_valid(id));
    }
}

/// Contract: a function keeps its captured scope alive
#[test]
fn contract_function_scope_is_traced() {
    let mut heap = Heap::new();
    let scope = heap.allocate_scope(Scope::new(None, true));
    let func = heap.allocate(JsObject::new(
        ObjectKind::Function(FunctionData {
            name: "f".into(),
            code: FunctionCode::Native(Rc::new(())),
            scope: Some(scope),
            constructor: false,
        }),
        None,
    ));
    heap.collect_garbage(&[Value::HeapObject(func)]);
    assert!(heap.scope(scope).is_some());
}

/// Contract: cycles without roots are collected
#[test]
fn contract_unreachable_cycle_is_collected() {
    let mut heap = Heap::new();
    let a = heap.allocate(plain(None));
    let b = heap.allocate(plain(None));
    heap.get_mut(a)
        .unwrap()
        .properties
        .insert("b".into(), Value::HeapObject(b), true);
    heap.get_mut(b)
        .unwrap()
        .properties
        .insert("a".into(), Value::HeapObject(a), true);
    heap.collect_garbage(&[]);
    assert!(!heap.is_valid(a));
    assert!(!heap.is_valid(b));
    assert_eq!(heap.stats().last_freed, 2);
}

/// Contract: embedder data of dead objects is returned, not dropped in place
#[test]
fn contract_host_data_is_handed_back() {
    let mut heap = Heap::new();
    let dropped = Rc::new(Cell::new(false));
    let id = heap.allocate(plain(None));
    assert!(heap
        .set_host_data(id, Box::new(DropFlag(dropped.clone())))
        .is_ok());
    assert!(heap.host_data(id).unwrap().is::<DropFlag>());

    let finalized = heap.collect_garbage(&[]);
    assert_eq!(finalized.len(), 1);
    assert!(!dropped.get());
    drop(finalized);
    assert!(dropped.get());
}

/// Contract: host data cannot be attached to a dead object
#[test]
fn contract_host_data_rejected_for_stale_handle() {
    let mut heap = Heap::new();
    let id = heap.allocate(plain(None));
    heap.collect_garbage(&[]);
    assert!(heap.set_host_data(id, Box::new(5u8)).is_err());
}

/// Contract: weak handles observe collection
#[test]
fn contract_weak_object_upgrade() {
    let mut heap = Heap::new();
    let id = heap.allocate(plain(None));
    let weak = WeakObject::new(id);
    let root = heap.add_root(Value::HeapObject(id));
    heap.collect_garbage(&[]);
    assert_eq!(weak.upgrade(&heap), Some(id));
    heap.remove_root(root);
    heap.collect_garbage(&[]);
    assert_eq!(weak.upgrade(&heap), None);
}

/// Contract: identity hashes are stable and respect the mask
#[test]
fn contract_identity_hash_mask() {
    let mut heap = Heap::new();
    heap.set_identity_hash_mask(0x3);
    let ids: Vec<_> = (0..16).map(|_| heap.allocate(plain(None))).collect();
    for id in &ids {
        let hash = heap.identity_hash(*id).unwrap();
        assert!(hash <= 3);
        assert_eq!(heap.identity_hash(*id), Some(hash));
    }
}

/// Contract: roots are recycled and counted
#[test]
fn contract_root_bookkeeping() {
    let mut heap = Heap::new();
    let a = heap.add_root(Value::Smi(1));
    let b = heap.add_root(Value::Smi(2));
    assert_eq!(heap.root_count(), 2);
    heap.remove_root(a);
    heap.remove_root(a);
    assert_eq!(heap.root_count(), 1);
    assert_eq!(heap.get_root(b), Some(Value::Smi(2)));
    heap.set_root(b, Value::Smi(3));
    assert_eq!(heap.get_root(b), Some(Value::Smi(3)));
    assert_eq!(heap.get_root(a), None);
}

/// Contract: external memory accounting
#[test]
fn contract_external_memory() {
    let mut heap = Heap::new();
    assert_eq!(heap.adjust_external_memory(1000), 1000);
    assert_eq!(heap.adjust_external_memory(-400), 600);
    assert_eq!(heap.stats().external_memory, 600);
}
