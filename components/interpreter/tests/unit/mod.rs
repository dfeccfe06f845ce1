//! Unit tests for the script engine

use core_types::{ErrorKind, Value};
use interpreter::VM;

fn eval(source: &str) -> Value {
    let vm = VM::new();
    match vm.eval(source, "test") {
        Ok(value) => value,
        Err(err) => panic!("{}", vm.describe_exception(&err)),
    }
}

fn eval_string(source: &str) -> String {
    let vm = VM::new();
    match vm.eval(source, "test") {
        Ok(value) => vm.to_display_string(&value),
        Err(err) => panic!("{}", vm.describe_exception(&err)),
    }
}

fn eval_error(source: &str) -> (ErrorKind, String, u32) {
    let vm = VM::new();
    let err = vm.eval(source, "test").expect_err("script should throw");
    let described = vm.describe_exception(&err);
    let line = described.line();
    (described.kind, described.message, line)
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_arithmetic_and_precedence() {
    assert_eq!(eval("1 + 2 * 3"), Value::Smi(7));
    assert_eq!(eval("(1 + 2) * 3"), Value::Smi(9));
    assert_eq!(eval("7 % 3"), Value::Smi(1));
    assert_eq!(eval("2 ** 10"), Value::Smi(1024));
    assert_eq!(eval("1 / 2"), Value::Double(0.5));
    assert_eq!(eval("2147483647 + 1"), Value::Double(2147483648.0));
}

#[test]
fn test_string_concatenation_coerces() {
    assert_eq!(eval("'a' + 1"), Value::String("a1".into()));
    assert_eq!(eval("1 + '2'"), Value::String("12".into()));
    assert_eq!(eval("'x' + [1, 2]"), Value::String("x1,2".into()));
    assert_eq!(eval("'' + {}"), Value::String("[object Object]".into()));
    assert_eq!(eval("'' + null + undefined"), Value::String("nullundefined".into()));
}

#[test]
fn test_equality() {
    assert_eq!(eval("1 == '1'"), Value::Boolean(true));
    assert_eq!(eval("1 === '1'"), Value::Boolean(false));
    assert_eq!(eval("null == undefined"), Value::Boolean(true));
    assert_eq!(eval("null === undefined"), Value::Boolean(false));
    assert_eq!(eval("NaN == NaN"), Value::Boolean(false));
    assert_eq!(eval("var o = {}; o === o"), Value::Boolean(true));
    assert_eq!(eval("({}) == ({})"), Value::Boolean(false));
    assert_eq!(eval("true == 1"), Value::Boolean(true));
}

#[test]
fn test_comparison() {
    assert_eq!(eval("1 < 2"), Value::Boolean(true));
    assert_eq!(eval("'a' < 'b'"), Value::Boolean(true));
    assert_eq!(eval("'10' < '9'"), Value::Boolean(true));
    assert_eq!(eval("'10' < 9"), Value::Boolean(false));
    assert_eq!(eval("NaN <= NaN"), Value::Boolean(false));
    assert_eq!(eval("3 >= 3"), Value::Boolean(true));
}

#[test]
fn test_bitwise_operators() {
    assert_eq!(eval("5 & 3"), Value::Smi(1));
    assert_eq!(eval("5 | 3"), Value::Smi(7));
    assert_eq!(eval("~0"), Value::Smi(-1));
    assert_eq!(eval("1 << 31"), Value::Smi(i32::MIN));
    assert_eq!(eval("-1 >>> 0"), Value::Double(4294967295.0));
    assert_eq!(eval("-8 >> 1"), Value::Smi(-4));
}

#[test]
fn test_typeof() {
    assert_eq!(eval_string("typeof 1"), "number");
    assert_eq!(eval_string("typeof 'x'"), "string");
    assert_eq!(eval_string("typeof null"), "object");
    assert_eq!(eval_string("typeof undefined"), "undefined");
    assert_eq!(eval_string("typeof notDeclared"), "undefined");
    assert_eq!(eval_string("typeof function() {}"), "function");
    assert_eq!(eval_string("typeof []"), "object");
}

#[test]
fn test_logical_short_circuit() {
    assert_eq!(eval("var n = 0; false && n++; n"), Value::Smi(0));
    assert_eq!(eval("0 || 'fallback'"), Value::String("fallback".into()));
    assert_eq!(eval("1 && 2"), Value::Smi(2));
}

#[test]
fn test_update_and_compound_assignment() {
    assert_eq!(eval("var i = 1; i++ + ++i"), Value::Smi(4));
    assert_eq!(eval("var o = {n: 1}; o.n += 5; o.n"), Value::Smi(6));
    assert_eq!(eval("var a = [1]; a[0]--; a[0]"), Value::Smi(0));
}

// ============================================================================
// Statements and scoping
// ============================================================================

#[test]
fn test_completion_value() {
    assert_eq!(eval("1; 2; var x = 3;"), Value::Smi(2));
    assert_eq!(eval("if (true) { 'yes' } else { 'no' }"), Value::String("yes".into()));
    assert_eq!(eval("var x;"), Value::Undefined);
}

#[test]
fn test_loops() {
    assert_eq!(eval("var s = 0; for (var i = 0; i < 5; i++) s += i; s"), Value::Smi(10));
    assert_eq!(eval("var n = 0; while (n < 3) n++; n"), Value::Smi(3));
    assert_eq!(eval("var n = 0; do { n++ } while (n < 0); n"), Value::Smi(1));
    assert_eq!(
        eval("var s = 0; for (var i = 0; i < 10; i++) { if (i == 2) continue; if (i == 4) break; s += i } s"),
        Value::Smi(4)
    );
}

#[test]
fn test_for_in_order() {
    assert_eq!(
        eval_string("var o = {b: 1, a: 2}; o.c = 3; var k = []; for (var p in o) k.push(p); k.join()"),
        "b,a,c"
    );
    assert_eq!(
        eval_string("var k = []; for (var i in [7, 8]) k.push(i); k.join('|')"),
        "0|1"
    );
}

#[test]
fn test_closures_capture_variables() {
    let source = "
        function counter() {
            var n = 0;
            return function() { return ++n; };
        }
        var c = counter();
        c(); c();
        c()";
    assert_eq!(eval(source), Value::Smi(3));
}

#[test]
fn test_hoisting() {
    assert_eq!(eval("var r = f(); function f() { return 7 } r"), Value::Smi(7));
    assert_eq!(eval("function g() { return typeof v; var v = 1; } g()"), Value::String("undefined".into()));
}

#[test]
fn test_let_and_const_are_block_scoped() {
    assert_eq!(eval("var x = 1; { let x = 2; } x"), Value::Smi(1));
    let (kind, message, _) = eval_error("const c = 1; c = 2;");
    assert_eq!(kind, ErrorKind::TypeError);
    assert_eq!(message, "Assignment to constant variable.");
}

#[test]
fn test_named_function_expression_sees_itself() {
    assert_eq!(
        eval("var fact = function f(n) { return n <= 1 ? 1 : n * f(n - 1) }; fact(5)"),
        Value::Smi(120)
    );
}

#[test]
fn test_this_binding() {
    assert_eq!(eval("var o = {v: 3, get: function() { return this.v }}; o.get()"), Value::Smi(3));
    assert_eq!(eval("var v = 9; function g() { return this.v } g()"), Value::Smi(9));
}

#[test]
fn test_constructors_and_instanceof() {
    let source = "
        function Point(x, y) { this.x = x; this.y = y; }
        Point.prototype.sum = function() { return this.x + this.y; };
        var p = new Point(2, 3);
        [p.sum(), p instanceof Point, p.constructor === Point].join()";
    assert_eq!(eval_string(source), "5,true,true");
}

#[test]
fn test_arguments_object() {
    assert_eq!(eval("function f() { return arguments.length } f(1, 2, 3)"), Value::Smi(3));
}

// ============================================================================
// Exceptions
// ============================================================================

#[test]
fn test_try_catch_finally() {
    let source = "
        var log = [];
        try { log.push('try'); throw 'boom'; }
        catch (e) { log.push(e); }
        finally { log.push('finally'); }
        log.join()";
    assert_eq!(eval_string(source), "try,boom,finally");
}

#[test]
fn test_finally_runs_on_return() {
    let source = "
        var ran = false;
        function f() { try { return 1 } finally { ran = true } }
        f() + (ran ? 10 : 0)";
    assert_eq!(eval(source), Value::Smi(11));
}

#[test]
fn test_reference_error_location() {
    let (kind, message, line) = eval_error("var a = 1;\nvar b = 2;\nmissing + 1;");
    assert_eq!(kind, ErrorKind::ReferenceError);
    assert_eq!(message, "missing is not defined");
    assert_eq!(line, 3);
}

#[test]
fn test_not_a_function_message() {
    let (kind, message, _) = eval_error("var o = {}; o.nope()");
    assert_eq!(kind, ErrorKind::TypeError);
    assert_eq!(message, "o.nope is not a function");
}

#[test]
fn test_thrown_non_error_value() {
    let (kind, message, _) = eval_error("throw {toString: function() { return 'custom' }}");
    assert_eq!(kind, ErrorKind::Thrown);
    assert_eq!(message, "custom");
}

#[test]
fn test_user_error_subclass() {
    let source = "
        function MyError(m) { this.message = m; }
        MyError.prototype = Object.create(Error.prototype);
        MyError.prototype.name = 'MyError';
        throw new MyError('bad');";
    let (kind, message, _) = eval_error(source);
    assert_eq!(kind, ErrorKind::Thrown);
    assert_eq!(message, "MyError: bad");
}

#[test]
fn test_syntax_error_reports_line() {
    let (kind, _, line) = eval_error("var ok = 1;\nvar = ;");
    assert_eq!(kind, ErrorKind::SyntaxError);
    assert_eq!(line, 2);
}

// ============================================================================
// Builtins
// ============================================================================

#[test]
fn test_array_methods() {
    assert_eq!(eval_string("[1, 2, 3].map(function(x) { return x * 2 }).join('-')"), "2-4-6");
    assert_eq!(eval_string("[1, 2, 3, 4].filter(function(x) { return x % 2 }).join()"), "1,3");
    assert_eq!(eval_string("[1, 2, 3].slice(-2).join()"), "2,3");
    assert_eq!(eval("[5, 6, 7].indexOf(6)"), Value::Smi(1));
    assert_eq!(eval("var a = [1]; a.push(2, 3); a.length"), Value::Smi(3));
    assert_eq!(eval_string("[1].concat([2, 3], 4).join()"), "1,2,3,4");
    assert_eq!(eval("Array.isArray([])"), Value::Boolean(true));
    assert_eq!(eval("var a = []; a[3] = 1; a.length"), Value::Smi(4));
}

#[test]
fn test_array_length_limit() {
    assert_eq!(eval("new Array(3).length"), Value::Smi(3));
    for source in ["new Array(2147483647)", "var a = []; a.length = 2147483647", "new Array(-1)"] {
        let (kind, message, _) = eval_error(source);
        assert_eq!(kind, ErrorKind::RangeError);
        assert_eq!(message, "Invalid array length");
    }
}

#[test]
fn test_string_methods() {
    assert_eq!(eval_string("'Hello'.toUpperCase()"), "HELLO");
    assert_eq!(eval_string("'a,b,c'.split(',').reverse().join('')"), "cba");
    assert_eq!(eval("'hello'.indexOf('l')"), Value::Smi(2));
    assert_eq!(eval_string("'hello'.slice(1, -1)"), "ell");
    assert_eq!(eval("'héllo'.length"), Value::Smi(5));
    assert_eq!(eval_string("'abc'.charAt(1)"), "b");
    assert_eq!(eval_string("'a-b'.replace('-', '+')"), "a+b");
}

#[test]
fn test_object_builtins() {
    assert_eq!(eval_string("Object.keys({x: 1, y: 2}).join()"), "x,y");
    assert_eq!(eval("var p = {}; Object.getPrototypeOf(Object.create(p)) === p"), Value::Boolean(true));
    assert_eq!(eval("({a: 1}).hasOwnProperty('a')"), Value::Boolean(true));
    assert_eq!(eval_string("Object.prototype.toString.call([])"), "[object Array]");
}

#[test]
fn test_function_call_apply_bind() {
    assert_eq!(eval("function f(a, b) { return this.k + a + b } f.call({k: 1}, 2, 3)"), Value::Smi(6));
    assert_eq!(eval("function f(a, b) { return a * b } f.apply(null, [6, 7])"), Value::Smi(42));
    assert_eq!(eval("function f(a, b) { return a - b } var g = f.bind(null, 10); g(4)"), Value::Smi(6));
}

#[test]
fn test_number_and_math() {
    assert_eq!(eval_string("(255).toString(16)"), "ff");
    assert_eq!(eval_string("(3.14159).toFixed(2)"), "3.14");
    assert_eq!(eval("Math.max(1, 5, 3)"), Value::Smi(5));
    assert_eq!(eval("Math.floor(-1.5)"), Value::Smi(-2));
    assert_eq!(eval("parseInt('42px')"), Value::Smi(42));
    assert_eq!(eval("isNaN(parseFloat('x'))"), Value::Boolean(true));
}

#[test]
fn test_error_to_string() {
    assert_eq!(eval_string("String(new TypeError('bad'))"), "TypeError: bad");
    assert_eq!(eval_string("new Error().toString()"), "Error");
    assert_eq!(eval("new RangeError('x') instanceof Error"), Value::Boolean(true));
}
