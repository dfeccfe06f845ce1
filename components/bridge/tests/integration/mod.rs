//! Integration tests: host classes, reverse classing and guest threads

use bridge::{BridgeConfig, BridgeContext};
use host_runtime::{CallContext, HostError, HostRef, HostRuntime, HostValue};
use std::collections::HashMap;
use std::rc::Rc;

fn point_runtime() -> Rc<HostRuntime> {
    let rt = Rc::new(HostRuntime::new());
    rt.define_class("Shape", &[]);
    rt.define_method("Shape", "area", |_, _| Ok(vec![HostValue::Int(0)]));
    rt.define_method("Shape", "describe", |rt, call| {
        let area = rt.call_method(&call.args[0], "area", vec![], CallContext::Scalar)?;
        Ok(vec![HostValue::from(format!("area={}", area[0]))])
    });
    rt.define_class("Rect", &["Shape"]);
    rt.define_method("Rect", "area", |_, call| {
        let this = call.args[0].as_ref().ok_or_else(|| HostError::die("not an object"))?;
        let w = this.hash_get("w").map(|v| v.as_number()).unwrap_or(0.0);
        let h = this.hash_get("h").map(|v| v.as_number()).unwrap_or(0.0);
        Ok(vec![HostValue::Float(w * h)])
    });
    rt.define_method("Rect", "scale", |_, call| {
        let this = call.args[0].as_ref().ok_or_else(|| HostError::die("not an object"))?;
        let factor = call.args.get(1).map(HostValue::as_number).unwrap_or(1.0);
        for key in ["w", "h"] {
            let current = this.hash_get(key).map(|v| v.as_number()).unwrap_or(0.0);
            this.hash_insert(key, HostValue::Float(current * factor));
        }
        Ok(vec![call.args[0].clone()])
    });
    rt
}

fn rect(rt: &HostRuntime, w: i64, h: i64) -> HostRef {
    let mut entries = HashMap::new();
    entries.insert("w".to_string(), HostValue::Int(w));
    entries.insert("h".to_string(), HostValue::Int(h));
    let rect = HostRef::new_hash(entries);
    rt.bless(&rect, "Rect");
    rect
}

#[test]
fn test_blessed_methods_dispatch_to_host() {
    let rt = point_runtime();
    let ctx = BridgeContext::new(rt.clone(), BridgeConfig::default());
    ctx.bind("r", HostValue::Ref(rect(&rt, 3, 4)));
    assert!(matches!(ctx.evaluate("r.area()", None).unwrap(), HostValue::Int(12)));
    assert_eq!(
        ctx.evaluate("r.describe()", None).unwrap().to_display_string(),
        "area=12"
    );
}

#[test]
fn test_blessed_proxy_identity_and_mutation() {
    let rt = point_runtime();
    let ctx = BridgeContext::new(rt.clone(), BridgeConfig::default());
    let r = rect(&rt, 1, 2);
    ctx.bind("a", HostValue::Ref(r.clone()));
    ctx.bind("b", HostValue::Ref(r.clone()));
    assert!(matches!(ctx.evaluate("a === b", None).unwrap(), HostValue::Int(1)));
    assert!(matches!(
        ctx.evaluate("a.scale(10) === a", None).unwrap(),
        HostValue::Int(1)
    ));
    assert!(matches!(r.hash_get("w"), Some(HostValue::Float(w)) if w == 10.0));

    let back = ctx.evaluate("b", None).unwrap();
    assert!(back.as_ref().unwrap().ptr_eq(&r));
    assert_eq!(ctx.prototype_count(), 1);
}

#[test]
fn test_missing_method_is_a_guest_type_error() {
    let rt = point_runtime();
    let ctx = BridgeContext::new(rt.clone(), BridgeConfig::default());
    ctx.bind("r", HostValue::Ref(rect(&rt, 1, 1)));
    let err = ctx.evaluate("r.perimeter()", None).unwrap_err();
    assert!(err.to_string().starts_with("TypeError"));
}

#[test]
fn test_host_method_may_shadow_object_builtins() {
    let rt = point_runtime();
    rt.define_method("Rect", "toString", |_, _| Ok(vec![HostValue::from("a rect")]));
    let ctx = BridgeContext::new(rt.clone(), BridgeConfig::default());
    ctx.bind("r", HostValue::Ref(rect(&rt, 1, 1)));
    assert_eq!(
        ctx.evaluate("'' + r", None).unwrap().to_display_string(),
        "a rect"
    );
}

#[test]
fn test_to_js_builds_guest_representation() {
    let rt = point_runtime();
    rt.define_class("Point", &[]);
    rt.define_method("Point", "x", |_, call| {
        Ok(vec![call.args[0]
            .as_ref()
            .and_then(|p| p.hash_get("x"))
            .unwrap_or_default()])
    });
    rt.define_method("Point", "to_js", |_, _| {
        Ok(vec![HostValue::from(
            "(function() { return { x: this.x(), kind: 'point' }; })",
        )])
    });
    let point = HostRef::new_hash(HashMap::from([("x".to_string(), HostValue::Int(3))]));
    rt.bless(&point, "Point");

    let ctx = BridgeContext::new(rt.clone(), BridgeConfig::default());
    ctx.bind("p", HostValue::Ref(point.clone()));
    assert_eq!(
        ctx.evaluate("p.kind + ':' + p.x", None).unwrap().to_display_string(),
        "point:3"
    );
    assert!(ctx.last_error().is_none());
}

#[test]
fn test_broken_to_js_is_recorded() {
    let rt = Rc::new(HostRuntime::new());
    rt.define_class("Broken", &[]);
    rt.define_method("Broken", "name", |_, _| Ok(vec![HostValue::from("broken")]));
    rt.define_method("Broken", "to_js", |_, _| Ok(vec![HostValue::from("function(")]));
    let value = HostRef::new_hash(HashMap::new());
    rt.bless(&value, "Broken");

    let ctx = BridgeContext::new(rt.clone(), BridgeConfig::default());
    ctx.bind("b", HostValue::Ref(value));
    let recorded = ctx.last_error().expect("compile failure is recorded");
    assert!(recorded.contains("EVAL"));
    assert_eq!(
        ctx.evaluate("b.name()", None).unwrap().to_display_string(),
        "broken"
    );
}

#[test]
fn test_reverse_classing() {
    let rt = Rc::new(HostRuntime::new());
    let config = BridgeConfig::default()
        .with_blessing(true)
        .with_bless_prefix("Guest::");
    let ctx = BridgeContext::new(rt.clone(), config);
    let counter = ctx
        .evaluate(
            "function Counter() { this.n = 0; }\n\
             Counter.prototype.__hostPackage = 'Counter';\n\
             Counter.prototype.inc = function(by) { this.n += by; return this.n; };\n\
             new Counter()",
            None,
        )
        .unwrap();
    let class = format!("Guest::Counter::N{}", ctx.instance());
    let instance = counter.as_ref().unwrap();
    assert_eq!(instance.blessed().as_deref(), Some(class.as_str()));
    assert!(rt.resolve_method(&class, "inc").is_some());

    let first = rt
        .call_method(&counter, "inc", vec![HostValue::Int(5)], CallContext::Scalar)
        .unwrap();
    assert!(matches!(first[0], HostValue::Int(5)));
    let second = rt
        .call_method(&counter, "inc", vec![HostValue::Int(2)], CallContext::Scalar)
        .unwrap();
    assert!(matches!(second[0], HostValue::Int(7)));

    ctx.bind("same", counter.clone());
    assert!(matches!(ctx.evaluate("same.n", None).unwrap(), HostValue::Int(7)));
}

#[test]
fn test_blessing_disabled_copies_objects() {
    let ctx = BridgeContext::new(Rc::new(HostRuntime::new()), BridgeConfig::default());
    let value = ctx
        .evaluate("({ __hostPackage: 'Counter', n: 1 })", None)
        .unwrap();
    let value = value.as_ref().unwrap();
    assert!(value.blessed().is_none());
    assert!(matches!(value.hash_get("n"), Some(HostValue::Int(1))));
}

#[test]
fn test_thread_start_and_join() {
    let ctx = BridgeContext::new(Rc::new(HostRuntime::new()), BridgeConfig::default());
    let result = ctx
        .evaluate(
            "var t = new Thread('(function(x) { return x + \"!\"; })');\n\
             t.start('hi');\n\
             t.join()",
            None,
        )
        .unwrap();
    assert_eq!(result.to_display_string(), "hi!");
}

#[test]
fn test_thread_errors() {
    let ctx = BridgeContext::new(Rc::new(HostRuntime::new()), BridgeConfig::default());
    let err = ctx.evaluate("new Thread('42')", None).unwrap_err();
    assert!(err.to_string().contains("Not a function."));

    let err = ctx
        .evaluate(
            "var t = new Thread('(function(x) { throw new Error(x); })', 'worker.js');\n\
             t.start('nope');\n\
             t.join()",
            None,
        )
        .unwrap_err();
    assert!(err.to_string().contains("Error: nope at worker.js:1"));

    let err = ctx.evaluate("Thread('1')", None).unwrap_err();
    assert!(err.to_string().starts_with("TypeError"));
}
