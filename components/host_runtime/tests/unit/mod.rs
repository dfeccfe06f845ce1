//! Unit tests for host values, cells and the class registry

use host_runtime::{CallContext, HostCode, HostKind, HostRef, HostRuntime, HostValue};
use std::collections::HashMap;

#[test]
fn test_array_push_and_get() {
    let array = HostRef::new_array(vec![HostValue::Int(1)]);
    assert!(array.array_push(HostValue::from("two")));
    assert_eq!(array.element_count(), Some(2));
    assert!(matches!(array.array_get(1), Some(HostValue::Str(s)) if s == "two"));
    assert_eq!(array.array_get(2).map(|_| ()), None);
}

#[test]
fn test_hash_insert_and_get() {
    let hash = HostRef::new_hash(HashMap::new());
    assert!(hash.hash_insert("a", HostValue::Float(1.5)));
    assert!(matches!(hash.hash_get("a"), Some(HostValue::Float(f)) if f == 1.5));
    assert!(!HostRef::new_array(vec![]).hash_insert("a", HostValue::Undef));
}

#[test]
fn test_kinds() {
    assert_eq!(HostRef::new_scalar(HostValue::Undef).kind(), HostKind::Scalar);
    assert_eq!(HostRef::new_array(vec![]).kind(), HostKind::Array);
    assert_eq!(HostRef::new_hash(HashMap::new()).kind(), HostKind::Hash);
    let code = HostRef::new_code(HostCode::new(|_, _| Ok(vec![])));
    assert_eq!(code.kind(), HostKind::Code);
}

#[test]
fn test_reference_display() {
    let array = HostRef::new_array(vec![]);
    let text = HostValue::Ref(array.clone()).to_string();
    assert!(text.starts_with("ARRAY(0x"));

    let rt = HostRuntime::new();
    rt.bless(&array, "Point");
    let text = HostValue::Ref(array).to_string();
    assert!(text.starts_with("Point=ARRAY(0x"));
}

#[test]
fn test_number_display() {
    assert_eq!(HostValue::Int(-7).to_string(), "-7");
    assert_eq!(HostValue::Float(2.5).to_string(), "2.5");
    assert_eq!(HostValue::Float(f64::INFINITY).to_string(), "Inf");
    assert_eq!(HostValue::Undef.to_string(), "");
}

#[test]
fn test_declared_methods_in_definition_order() {
    let rt = HostRuntime::new();
    rt.define_method("Shape", "area", |_, _| Ok(vec![]));
    rt.define_method("Shape", "name", |_, _| Ok(vec![]));
    rt.define_method("Shape", "area", |_, _| Ok(vec![HostValue::Int(1)]));
    assert_eq!(rt.declared_methods("Shape"), vec!["area", "name"]);
    assert!(rt.declared_methods("Missing").is_empty());
}

#[test]
fn test_resolve_method_first_ancestor_wins() {
    let rt = HostRuntime::new();
    rt.define_class("Base", &[]);
    rt.define_class("Mixin", &[]);
    rt.define_class("Child", &["Base", "Mixin"]);
    let base = rt.define_method("Base", "hello", |_, _| Ok(vec![HostValue::from("base")]));
    rt.define_method("Mixin", "hello", |_, _| Ok(vec![HostValue::from("mixin")]));
    let resolved = rt.resolve_method("Child", "hello").unwrap();
    assert!(resolved.ptr_eq(&base));
}

#[test]
fn test_call_method_on_class_name() {
    let rt = HostRuntime::new();
    rt.define_method("Factory", "make", |_, call| {
        Ok(vec![HostValue::Int(call.args.len() as i64)])
    });
    let result = rt
        .call_method(&HostValue::from("Factory"), "make", vec![HostValue::Int(9)], CallContext::Scalar)
        .unwrap();
    assert!(matches!(result[0], HostValue::Int(2)));
}

#[test]
fn test_list_context_returns_everything() {
    let rt = HostRuntime::new();
    let code = HostRef::new_code(HostCode::new(|_, call| {
        assert_eq!(call.context, CallContext::List);
        Ok(vec![HostValue::Int(1), HostValue::Int(2), HostValue::Int(3)])
    }));
    let result = rt.call(&HostValue::Ref(code), vec![], CallContext::List).unwrap();
    assert_eq!(result.len(), 3);
}

#[test]
fn test_scalar_context_of_empty_list_is_undef() {
    let rt = HostRuntime::new();
    let code = HostRef::new_code(HostCode::new(|_, _| Ok(vec![])));
    let result = rt.call(&HostValue::Ref(code), vec![], CallContext::Scalar).unwrap();
    assert!(matches!(result.as_slice(), [HostValue::Undef]));
}
