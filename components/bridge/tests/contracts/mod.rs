//! Contract tests for identity and wrapper lifetimes
//!
//! These tests pin down what embedders may rely on: values that cross the
//! boundary twice come back as the same object, graphs keep their shape,
//! and wrappers release their counterpart once unreachable.

use bridge::{BridgeConfig, BridgeContext, CONTEXT_GONE, WRAPPER_EXTERNAL_BYTES};
use host_runtime::{CallContext, HostCode, HostData, HostRef, HostRuntime, HostValue};
use std::collections::HashMap;
use std::rc::Rc;

fn context() -> BridgeContext {
    BridgeContext::new(Rc::new(HostRuntime::new()), BridgeConfig::default())
}

fn settle(ctx: &BridgeContext) {
    while !ctx.idle_notification() {}
}

fn noop() -> HostRef {
    HostRef::new_code(HostCode::new(|_, _| Ok(vec![])))
}

/// Contract: a host code value converted twice is the same guest function
#[test]
fn test_host_code_identity_in_guest() {
    let ctx = context();
    let code = noop();
    ctx.bind("a", HostValue::Ref(code.clone()));
    ctx.bind("b", HostValue::Ref(code.clone()));
    assert!(matches!(ctx.evaluate("a === b", None).unwrap(), HostValue::Int(1)));
    assert_eq!(ctx.wrapper_count(), 1);
}

/// Contract: a host code value returns to the host as the same cell
#[test]
fn test_host_code_round_trip() {
    let ctx = context();
    let code = noop();
    ctx.bind("f", HostValue::Ref(code.clone()));
    let back = ctx.evaluate("f", None).unwrap();
    assert!(back.as_ref().unwrap().ptr_eq(&code));
}

/// Contract: a guest function converted twice is the same host cell while
/// the first cell lives
#[test]
fn test_guest_function_identity_in_host() {
    let ctx = context();
    let first = ctx.evaluate("var g = function() { return 1; }; g", None).unwrap();
    let second = ctx.evaluate("g", None).unwrap();
    assert!(first.as_ref().unwrap().ptr_eq(second.as_ref().unwrap()));

    ctx.bind("h", first);
    assert!(matches!(ctx.evaluate("g === h", None).unwrap(), HostValue::Int(1)));
}

/// Contract: a self-containing host array stays self-containing
#[test]
fn test_host_cycle_preserved() {
    let ctx = context();
    let array = HostRef::new_array(vec![HostValue::Int(1)]);
    array.array_push(HostValue::Ref(array.clone()));
    ctx.bind("a", HostValue::Ref(array.clone()));
    assert!(matches!(ctx.evaluate("a[1] === a", None).unwrap(), HostValue::Int(1)));
    assert!(matches!(ctx.evaluate("a[1][1][0]", None).unwrap(), HostValue::Int(1)));
    // Break the host-side cycle so the cell is freed.
    if let HostData::Array(elements) = &mut *array.data_mut() {
        elements.clear();
    };
}

/// Contract: a self-containing guest array stays self-containing
#[test]
fn test_guest_cycle_preserved() {
    let ctx = context();
    let result = ctx.evaluate("var x = [1]; x.push(x); x", None).unwrap();
    let array = result.as_ref().unwrap();
    let inner = array.array_get(1).unwrap();
    assert!(inner.as_ref().unwrap().ptr_eq(array));
    if let HostData::Array(elements) = &mut *array.data_mut() {
        elements.clear();
    };
}

/// Contract: shared sub-structures stay shared in both directions
#[test]
fn test_sharing_preserved() {
    let ctx = context();
    let shared = HostRef::new_hash(HashMap::new());
    let outer = HostRef::new_array(vec![HostValue::Ref(shared.clone()), HostValue::Ref(shared)]);
    ctx.bind("pair", HostValue::Ref(outer));
    assert!(matches!(
        ctx.evaluate("pair[0] === pair[1]", None).unwrap(),
        HostValue::Int(1)
    ));

    let result = ctx.evaluate("var s = {k: 1}; [s, s, {k: 1}]", None).unwrap();
    let array = result.as_ref().unwrap();
    let first = array.array_get(0).unwrap();
    let second = array.array_get(1).unwrap();
    let third = array.array_get(2).unwrap();
    assert!(first.as_ref().unwrap().ptr_eq(second.as_ref().unwrap()));
    assert!(!first.as_ref().unwrap().ptr_eq(third.as_ref().unwrap()));
}

/// Contract: separate conversions of one guest object are separate copies
#[test]
fn test_copies_are_per_conversion() {
    let ctx = context();
    let first = ctx.evaluate("var o = {}; o", None).unwrap();
    let second = ctx.evaluate("o", None).unwrap();
    assert!(!first.as_ref().unwrap().ptr_eq(second.as_ref().unwrap()));
}

/// Contract: each live host-origin wrapper charges external memory, and the
/// charge is refunded once the guest side is collected
#[test]
fn test_external_memory_charge_and_refund() {
    let ctx = context();
    let before = ctx.adjust_external_memory(0);
    let code = noop();
    ctx.bind("f", HostValue::Ref(code.clone()));
    assert_eq!(ctx.adjust_external_memory(0), before + WRAPPER_EXTERNAL_BYTES);
    assert_eq!(code.refcount(), 2);
    ctx.evaluate("f(); f()", None).unwrap();
    assert_eq!(code.refcount(), 2);

    ctx.evaluate("f = null", None).unwrap();
    settle(&ctx);
    assert_eq!(ctx.adjust_external_memory(0), before);
    assert_eq!(code.refcount(), 1);
    assert_eq!(ctx.wrapper_count(), 0);
}

/// Contract: a guest function stays alive while its host cell does
#[test]
fn test_guest_function_rooted_by_host_cell() {
    let ctx = context();
    let f = ctx
        .evaluate("(function(a, b) { return a * b; })", None)
        .unwrap();
    settle(&ctx);
    let product = ctx
        .host()
        .call(&f, vec![HostValue::Int(6), HostValue::Int(7)], CallContext::Scalar)
        .unwrap();
    assert!(matches!(product[0], HostValue::Int(42)));

    assert_eq!(ctx.wrapper_count(), 1);
    drop(f);
    assert_eq!(ctx.wrapper_count(), 0);
}

/// Contract: calling into a dropped context fails with a fatal error
#[test]
fn test_context_gone() {
    let host = Rc::new(HostRuntime::new());
    let ctx = BridgeContext::new(host.clone(), BridgeConfig::default());
    let f = ctx.evaluate("(function() { return 1; })", None).unwrap();
    drop(ctx);
    let err = host.call(&f, vec![], CallContext::Scalar).unwrap_err();
    assert_eq!(err.trimmed(), CONTEXT_GONE);
}

/// Contract: guest exceptions raised under a host call carry their location
#[test]
fn test_guest_exception_reaches_host() {
    let ctx = context();
    let f = ctx
        .evaluate("(function() {\n  throw new Error('bad');\n})", Some("lib.js"))
        .unwrap();
    let err = ctx.host().call(&f, vec![], CallContext::Scalar).unwrap_err();
    assert_eq!(err.trimmed(), "Error: bad at lib.js:2");
}

/// Contract: functions flagged with `__hostReturnsList` return array
/// elements as a list, or their count in scalar context
#[test]
fn test_returns_list() {
    let ctx = context();
    let pair = ctx
        .evaluate(
            "var pair = function() { return [1, 'two']; }; pair.__hostReturnsList = true; pair",
            None,
        )
        .unwrap();
    let list = ctx.host().call(&pair, vec![], CallContext::List).unwrap();
    assert_eq!(list.len(), 2);
    assert!(matches!(list[0], HostValue::Int(1)));
    assert!(matches!(&list[1], HostValue::Str(s) if s == "two"));
    let scalar = ctx.host().call(&pair, vec![], CallContext::Scalar).unwrap();
    assert!(matches!(scalar.as_slice(), [HostValue::Int(2)]));

    let plain = ctx.evaluate("(function() { return [1, 2]; })", None).unwrap();
    let result = ctx.host().call(&plain, vec![], CallContext::List).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].as_ref().unwrap().element_count(), Some(2));
}

/// Contract: evaluation budgets stop runaway scripts and are reset afterwards
#[test]
fn test_time_limit() {
    let ctx = BridgeContext::new(
        Rc::new(HostRuntime::new()),
        BridgeConfig::default().with_time_limit(1),
    );
    let started = std::time::Instant::now();
    let err = ctx.evaluate("while (true) {}", None).unwrap_err();
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert!(err.to_string().contains("timed out"));
    assert!(matches!(ctx.evaluate("1 + 1", None).unwrap(), HostValue::Int(2)));
}

/// Contract: termination cannot be swallowed by a host function
#[test]
fn test_time_limit_through_host_call() {
    let ctx = BridgeContext::new(
        Rc::new(HostRuntime::new()),
        BridgeConfig::default().with_time_limit(1),
    );
    let spin = ctx.evaluate("(function() { while (true) {} })", None).unwrap();
    ctx.bind("spin", spin);
    ctx.bind_function("relay", |rt, call| rt.call(&call.args[0], vec![], CallContext::Scalar));
    let err = ctx
        .evaluate("try { relay(spin); 'swallowed' } catch (e) { 'caught' }", None)
        .unwrap_err();
    assert!(err.to_string().contains("timed out"));
}
