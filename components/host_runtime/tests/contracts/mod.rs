//! Contract tests for the host runtime
//!
//! These tests pin down the guarantees the bridge relies on: stable cell
//! identity, attachment finalization, error text and method dispatch.

use host_runtime::{CallContext, HostCode, HostError, HostRef, HostRuntime, HostValue};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

struct Finalizer(Rc<Cell<u32>>);

impl Drop for Finalizer {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Contract: an attachment is finalized exactly once, when the last reference goes
#[test]
fn test_magic_finalized_with_last_reference() {
    let count = Rc::new(Cell::new(0));
    let cell = HostRef::new_hash(HashMap::new());
    cell.attach_magic(Box::new(Finalizer(count.clone())));
    let other = cell.clone();
    drop(cell);
    assert_eq!(count.get(), 0);
    drop(other);
    assert_eq!(count.get(), 1);
}

/// Contract: cell addresses identify cells while they are alive
#[test]
fn test_address_identity() {
    let a = HostRef::new_array(vec![]);
    let b = HostRef::new_array(vec![]);
    assert_ne!(a.address(), b.address());
    assert_eq!(a.address(), a.clone().address());
}

/// Contract: errors raised by host code are returned with a trailing newline
#[test]
fn test_errors_caught() {
    let rt = HostRuntime::new();
    let code = HostRef::new_code(HostCode::new(|_, _| Err(HostError::die("bad thing"))));
    let err = rt.call(&HostValue::Ref(code), vec![], CallContext::Scalar).unwrap_err();
    assert_eq!(err.message(), "bad thing\n");
    assert_eq!(err.trimmed(), "bad thing");
}

/// Contract: calling something that is not code fails
#[test]
fn test_not_code() {
    let rt = HostRuntime::new();
    let err = rt
        .call(&HostValue::Ref(HostRef::new_array(vec![])), vec![], CallContext::Scalar)
        .unwrap_err();
    assert_eq!(err.trimmed(), "Not a CODE reference");
    let err = rt.call(&HostValue::Int(1), vec![], CallContext::Scalar).unwrap_err();
    assert_eq!(err.trimmed(), "Not a CODE reference");
}

/// Contract: unresolvable methods name the method and the class
#[test]
fn test_missing_method_message() {
    let rt = HostRuntime::new();
    let object = HostRef::new_hash(HashMap::new());
    rt.bless(&object, "Widget");
    let err = rt
        .call_method(&HostValue::Ref(object), "frob", vec![], CallContext::Scalar)
        .unwrap_err();
    assert_eq!(
        err.trimmed(),
        "Can't locate object method \"frob\" via package \"Widget\""
    );
}

/// Contract: method calls on unblessed or undefined invocants fail
#[test]
fn test_method_on_non_object() {
    let rt = HostRuntime::new();
    let err = rt
        .call_method(&HostValue::Ref(HostRef::new_array(vec![])), "x", vec![], CallContext::Scalar)
        .unwrap_err();
    assert!(err.trimmed().contains("unblessed reference"));
    let err = rt
        .call_method(&HostValue::Undef, "x", vec![], CallContext::Scalar)
        .unwrap_err();
    assert!(err.trimmed().contains("undefined value"));
}

/// Contract: method calls pass the invocant first and flag the call as a method
#[test]
fn test_method_call_shape() {
    let rt = HostRuntime::new();
    let object = HostRef::new_scalar(HostValue::Int(5));
    rt.bless(&object, "Box");
    let expected = object.clone();
    rt.define_method("Box", "check", move |_, call| {
        assert!(call.method);
        assert!(matches!(&call.args[0], HostValue::Ref(r) if r.ptr_eq(&expected)));
        Ok(vec![call.args[1].clone()])
    });
    let result = rt
        .call_method(&HostValue::Ref(object), "check", vec![HostValue::from("x")], CallContext::Scalar)
        .unwrap();
    assert!(matches!(&result[0], HostValue::Str(s) if s == "x"));
}

/// Contract: host functions may re-enter the runtime
#[test]
fn test_reentrant_calls() {
    let rt = HostRuntime::new();
    rt.define_method("Math", "double", |_, call| {
        Ok(vec![HostValue::Int(call.args[1].as_number() as i64 * 2)])
    });
    rt.define_method("Math", "quadruple", |rt, call| {
        let once = rt.call_method(&call.args[0], "double", vec![call.args[1].clone()], CallContext::Scalar)?;
        rt.call_method(&call.args[0], "double", once, CallContext::Scalar)
    });
    let result = rt
        .call_method(&HostValue::from("Math"), "quadruple", vec![HostValue::Int(3)], CallContext::Scalar)
        .unwrap();
    assert!(matches!(result[0], HostValue::Int(12)));
}
