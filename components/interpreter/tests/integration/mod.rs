//! Integration tests for native functions and cross-thread termination

use core_types::{ErrorKind, Value};
use interpreter::VM;
use std::cell::Cell;
use std::time::{Duration, Instant};

fn install(vm: &VM, name: &str, function: core_types::ObjectId) {
    vm.define_own(vm.global_object(), name, Value::HeapObject(function), false);
}

#[test]
fn test_native_function_reenters_engine() {
    let vm = VM::new();
    let run = vm.create_native_function("run", |vm, call| {
        let source = vm.to_string_value(&call.arg(0))?;
        vm.eval(&source, "nested")
    });
    install(&vm, "run", run);
    assert_eq!(vm.eval("run('1 + 1') * 10", "test").unwrap(), Value::Smi(20));
}

#[test]
fn test_native_function_calls_script_callback() {
    let vm = VM::new();
    let twice = vm.create_native_function("twice", |vm, call| {
        let f = call.arg(0);
        let once = vm.call(&f, &Value::Undefined, &[Value::Smi(1)])?;
        vm.call(&f, &Value::Undefined, &[once])
    });
    install(&vm, "twice", twice);
    assert_eq!(
        vm.eval("twice(function(x) { return x + 10 })", "test").unwrap(),
        Value::Smi(21)
    );
}

#[test]
fn test_native_state_in_host_data() {
    let vm = VM::new();
    let counter = vm.create_native_function("counter", |vm, call| {
        let next = vm
            .with_host_data::<Cell<i32>, _>(call.callee, |c| {
                c.set(c.get() + 1);
                c.get()
            })
            .unwrap_or(0);
        Ok(Value::Smi(next))
    });
    vm.set_host_data(counter, Box::new(Cell::new(0)));
    install(&vm, "counter", counter);
    assert_eq!(vm.eval("counter(); counter(); counter()", "test").unwrap(), Value::Smi(3));
}

#[test]
fn test_native_error_caught_by_script() {
    let vm = VM::new();
    let fail = vm.create_native_function("fail", |vm, _| {
        Err(vm.throw_error(ErrorKind::RangeError, "out of range"))
    });
    install(&vm, "fail", fail);
    let source = "try { fail() } catch (e) { e instanceof RangeError ? e.message : 'wrong' }";
    assert_eq!(vm.eval(source, "test").unwrap(), Value::String("out of range".into()));
}

#[test]
fn test_interrupt_from_other_thread() {
    let vm = VM::new();
    let handle = vm.interrupt_handle();
    let watchdog = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        handle.interrupt();
    });
    let started = Instant::now();
    let err = vm.eval("while (true) {}", "loop.js").unwrap_err();
    watchdog.join().unwrap();
    assert!(err.is_termination());
    assert!(started.elapsed() < Duration::from_secs(10));
    let described = vm.describe_exception(&err);
    assert_eq!(described.kind, ErrorKind::Terminated);
    assert_eq!(described.source_name.as_deref(), Some("loop.js"));

    vm.reset_interrupt();
    assert_eq!(vm.eval("1", "test").unwrap(), Value::Smi(1));
}

#[test]
fn test_closures_survive_collection_between_entries() {
    let vm = VM::new();
    vm.eval("var make = function(n) { return function() { return n } }; var f = make(42);", "test")
        .unwrap();
    vm.collect_garbage();
    vm.eval("for (var i = 0; i < 1000; i++) { ({i: i}) }", "test").unwrap();
    vm.collect_garbage();
    assert_eq!(vm.eval("f()", "test").unwrap(), Value::Smi(42));
}

#[test]
fn test_automatic_collection_by_interval() {
    let vm = VM::new();
    vm.set_flags_from_string("--gc-interval=100");
    let before = vm.gc_stats().collections;
    vm.eval("for (var i = 0; i < 500; i++) { [i] }", "test").unwrap();
    assert!(vm.gc_stats().collections > before);
}
