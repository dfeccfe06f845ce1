//! Parser to Interpreter Integration Tests
//!
//! Verifies that programs accepted by the parser run in the VM, and that
//! parse errors surface as located syntax errors.

use core_types::Value;
use interpreter::VM;

/// Test: declarations found by the parser are hoisted by the VM
#[test]
fn test_hoisted_declarations() {
    let program = parser::parse("var a = f(); function f() { return 1; }").unwrap();
    assert_eq!(program.var_names, vec!["a".to_string(), "f".to_string()]);

    let vm = VM::new();
    vm.eval("var a = f(); function f() { return 1; }", "test").unwrap();
    assert_eq!(vm.eval("a", "test").unwrap(), Value::Smi(1));
}

/// Test: closures capture their defining scope
#[test]
fn test_closures() {
    let vm = VM::new();
    let result = vm
        .eval(
            "function counter() { var n = 0; return function() { n += 1; return n; }; }\n\
             var c = counter(); c(); c(); c()",
            "test",
        )
        .unwrap();
    assert_eq!(result, Value::Smi(3));
}

/// Test: parse errors keep their line
#[test]
fn test_parse_error_location() {
    let err = parser::parse("var x = 1;\nvar = 2;").unwrap_err();
    assert_eq!(err.line(), 2);

    let vm = VM::new();
    let exception = vm.eval("var x = 1;\nvar = 2;", "lib.js").unwrap_err();
    let described = vm.describe_exception(&exception);
    assert!(described.to_string().starts_with("SyntaxError"));
    assert!(described.to_string().ends_with("at lib.js:2"));
}

/// Test: exceptions carry the line of the throw
#[test]
fn test_runtime_error_location() {
    let vm = VM::new();
    let exception = vm
        .eval("var o = {};\n\no.missing.field", "main.js")
        .unwrap_err();
    assert_eq!(exception.site().line, 3);
    assert_eq!(&*exception.site().source, "main.js");
}
