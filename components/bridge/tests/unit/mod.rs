//! Unit tests for value conversion through a bridge context

use bridge::{BridgeConfig, BridgeContext, BridgeError};
use core_types::Value;
use host_runtime::{HostCode, HostError, HostRef, HostRuntime, HostValue};
use std::collections::HashMap;
use std::rc::Rc;

fn context() -> BridgeContext {
    BridgeContext::new(Rc::new(HostRuntime::new()), BridgeConfig::default())
}

fn hash(entries: Vec<(&str, HostValue)>) -> HostRef {
    HostRef::new_hash(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<HashMap<_, _>>(),
    )
}

#[test]
fn test_scalars_reach_guest() {
    let ctx = context();
    ctx.bind("i", HostValue::Int(7));
    ctx.bind("f", HostValue::Float(0.25));
    ctx.bind("s", HostValue::from("text"));
    ctx.bind("u", HostValue::Undef);
    let result = ctx
        .evaluate("typeof i + typeof f + typeof s + typeof u", None)
        .unwrap();
    assert_eq!(result.to_display_string(), "numbernumberstringundefined");
}

#[test]
fn test_integer_boundaries() {
    let ctx = context();
    assert!(matches!(
        ctx.to_guest(&HostValue::Int(2147483647)),
        Value::Smi(2147483647)
    ));
    assert!(matches!(
        ctx.to_guest(&HostValue::Int(2147483648)),
        Value::Double(d) if d == 2147483648.0
    ));
    ctx.bind("big", HostValue::Int(2147483648));
    assert!(matches!(
        ctx.evaluate("big + 1", None).unwrap(),
        HostValue::Float(f) if f == 2147483649.0
    ));
}

#[test]
fn test_guest_primitives_reach_host() {
    let ctx = context();
    assert!(matches!(ctx.evaluate("40 + 2", None).unwrap(), HostValue::Int(42)));
    assert!(matches!(ctx.evaluate("1 / 4", None).unwrap(), HostValue::Float(f) if f == 0.25));
    assert!(matches!(ctx.evaluate("true", None).unwrap(), HostValue::Int(1)));
    assert!(matches!(ctx.evaluate("false", None).unwrap(), HostValue::Int(0)));
    assert!(ctx.evaluate("null", None).unwrap().is_undef());
    assert!(ctx.evaluate("undefined", None).unwrap().is_undef());
    assert!(matches!(ctx.evaluate("'a' + 'b'", None).unwrap(), HostValue::Str(s) if s == "ab"));
}

#[test]
fn test_bytes_decode_as_latin1() {
    let ctx = context();
    ctx.bind("word", HostValue::Bytes(vec![0x63, 0x61, 0x66, 0xe9]));
    let result = ctx.evaluate("word.length + ':' + word", None).unwrap();
    assert_eq!(result.to_display_string(), "4:caf\u{e9}");
}

#[test]
fn test_hash_is_copied_both_ways() {
    let ctx = context();
    let original = hash(vec![
        ("a", HostValue::Int(1)),
        ("b", HostValue::from("x")),
        ("c", HostValue::Ref(HostRef::new_array(vec![HostValue::Int(1), HostValue::Int(2)]))),
    ]);
    ctx.bind("config", HostValue::Ref(original.clone()));
    let back = ctx.evaluate("config", None).unwrap();
    let back = back.as_ref().unwrap();
    assert!(!back.ptr_eq(&original));
    assert!(matches!(back.hash_get("a"), Some(HostValue::Int(1))));
    assert!(matches!(back.hash_get("b"), Some(HostValue::Str(s)) if s == "x"));
    let list = back.hash_get("c").unwrap();
    assert_eq!(list.as_ref().unwrap().element_count(), Some(2));
}

#[test]
fn test_guest_mutation_does_not_touch_host_copy() {
    let ctx = context();
    let original = hash(vec![("a", HostValue::Int(1))]);
    ctx.bind("config", HostValue::Ref(original.clone()));
    ctx.evaluate("config.a = 99", None).unwrap();
    assert!(matches!(original.hash_get("a"), Some(HostValue::Int(1))));
}

#[test]
fn test_inherited_enumerable_properties_are_copied() {
    let ctx = context();
    let result = ctx
        .evaluate(
            "function P() { this.own = 1; } P.prototype.shared = 2; new P()",
            None,
        )
        .unwrap();
    let result = result.as_ref().unwrap();
    assert!(matches!(result.hash_get("own"), Some(HostValue::Int(1))));
    assert!(matches!(result.hash_get("shared"), Some(HostValue::Int(2))));
}

#[test]
fn test_host_function_receives_converted_arguments() {
    let ctx = context();
    ctx.bind_function("describe", |_, call| {
        let parts: Vec<String> = call
            .args
            .iter()
            .map(|arg| match arg {
                HostValue::Ref(r) => format!("{:?}:{}", r.kind(), r.element_count().unwrap_or(0)),
                other => other.to_display_string(),
            })
            .collect();
        Ok(vec![HostValue::from(parts.join(","))])
    });
    let result = ctx
        .evaluate("describe(1, 'two', [3, 4], {a: 1, b: 2, c: 3}, null)", None)
        .unwrap();
    assert_eq!(result.to_display_string(), "1,two,Array:2,Hash:3,");
}

#[test]
fn test_host_function_result_uses_last_value() {
    let ctx = context();
    ctx.bind_function("many", |_, _| Ok(vec![HostValue::Int(1), HostValue::Int(2)]));
    ctx.bind_function("none", |_, _| Ok(vec![]));
    assert!(matches!(ctx.evaluate("many()", None).unwrap(), HostValue::Int(2)));
    assert!(ctx.evaluate("none()", None).unwrap().is_undef());
}

#[test]
fn test_host_error_becomes_guest_error() {
    let ctx = context();
    ctx.bind_function("fail", |_, _| Err(HostError::die("boom")));
    let caught = ctx
        .evaluate(
            "try { fail(); 'no' } catch (e) { (e instanceof Error) + ':' + e.message }",
            None,
        )
        .unwrap();
    assert_eq!(caught.to_display_string(), "true:boom");

    let err = ctx.evaluate("fail()", None).unwrap_err();
    assert_eq!(err, BridgeError::Script("Error: boom at EVAL:1".to_string()));
}

#[test]
fn test_syntax_error_reports_origin() {
    let ctx = context();
    let err = ctx.evaluate("var = ;", None).unwrap_err();
    let message = err.script_message().unwrap();
    assert!(message.starts_with("SyntaxError"));
    assert!(message.ends_with("at EVAL:1"));

    let err = ctx.evaluate("\n\n)", Some("lib.js")).unwrap_err();
    assert!(err.to_string().ends_with("at lib.js:3"));
}

#[test]
fn test_thrown_values_are_reported() {
    let ctx = context();
    let err = ctx.evaluate("throw new TypeError('bad type')", Some("t.js")).unwrap_err();
    assert_eq!(err.to_string(), "TypeError: bad type at t.js:1");
    let err = ctx.evaluate("throw 'plain'", None).unwrap_err();
    assert_eq!(err.to_string(), "plain at EVAL:1");
}

#[test]
fn test_scalar_reference_becomes_undefined() {
    let ctx = context();
    ctx.bind("boxed", HostValue::Ref(HostRef::new_scalar(HostValue::Int(1))));
    assert_eq!(
        ctx.evaluate("typeof boxed", None).unwrap().to_display_string(),
        "undefined"
    );
}

#[test]
fn test_named_code_keeps_its_name() {
    let ctx = context();
    let code = HostRef::new_code(HostCode::new(|_, _| Ok(vec![])).named("Util::noop"));
    ctx.bind("noop", HostValue::Ref(code));
    assert_eq!(
        ctx.evaluate("noop.name", None).unwrap().to_display_string(),
        "Util::noop"
    );
}

#[test]
fn test_config_from_json() {
    let host = Rc::new(HostRuntime::new());
    let ctx = BridgeContext::from_json_config(host.clone(), r#"{"time_limit": 3, "flags": "--stack-limit=20"}"#)
        .unwrap();
    assert_eq!(ctx.config().time_limit, 3);
    assert_eq!(ctx.engine().flags().stack_limit, 20);

    let err = BridgeContext::from_json_config(host, "{not json").unwrap_err();
    assert!(matches!(err, BridgeError::Config(_)));
}

#[test]
fn test_instances_are_numbered() {
    let first = context();
    let second = context();
    assert!(second.instance() > first.instance());
}

#[test]
fn test_settings_usable_from_host_callbacks() {
    let ctx = Rc::new(context());
    let weak = Rc::downgrade(&ctx);
    ctx.bind_function("limit", move |_, _| {
        let ctx = weak.upgrade().ok_or_else(|| HostError::die("context dropped"))?;
        ctx.set_time_limit(7);
        assert!(ctx.last_error().is_none());
        Ok(vec![HostValue::Int(ctx.config().time_limit as i64)])
    });
    assert!(matches!(ctx.evaluate("limit()", None).unwrap(), HostValue::Int(7)));
    assert_eq!(ctx.config().time_limit, 7);
}
