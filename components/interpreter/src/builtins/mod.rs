//! Built-in objects installed into every engine.

mod array;
mod error;
mod function;
mod global;
mod math;
mod number;
mod object;
mod string;

use crate::exception::Exception;
use crate::vm::{NativeCall, VM};
use core_types::{ErrorKind, ObjectId, Value};

/// Result type of native functions.
pub(crate) type NativeResult = Result<Value, Exception>;

pub(crate) fn install(vm: &VM) {
    object::install(vm);
    function::install(vm);
    array::install(vm);
    error::install(vm);
    string::install(vm);
    number::install(vm);
    math::install(vm);
    global::install(vm);
    if vm.flags().expose_gc {
        install_gc(vm);
    }
}

/// Installs the global `gc()` function.
pub(crate) fn install_gc(vm: &VM) {
    let global = vm.global_object();
    if vm.has_own_property(global, "gc") {
        return;
    }
    method(vm, global, "gc", |vm, _| {
        vm.collect_garbage();
        Ok(Value::Undefined)
    });
}

/// Defines a non-enumerable native method on `target`.
pub(crate) fn method<F>(vm: &VM, target: ObjectId, name: &str, f: F)
where
    F: Fn(&VM, NativeCall<'_>) -> NativeResult + 'static,
{
    let function = vm.create_native_function(name, f);
    vm.define_own(target, name, Value::HeapObject(function), false);
}

/// Defines a global constructor linked with `prototype`.
pub(crate) fn constructor<F>(vm: &VM, name: &str, prototype: ObjectId, f: F) -> ObjectId
where
    F: Fn(&VM, NativeCall<'_>) -> NativeResult + 'static,
{
    let ctor = vm.create_native_constructor(name, f);
    vm.define_own(ctor, "prototype", Value::HeapObject(prototype), false);
    vm.define_own(prototype, "constructor", Value::HeapObject(ctor), false);
    vm.define_own(vm.global_object(), name, Value::HeapObject(ctor), false);
    ctor
}

pub(crate) fn number_arg(vm: &VM, call: &NativeCall<'_>, index: usize) -> Result<f64, Exception> {
    vm.to_number_value(&call.arg(index))
}

pub(crate) fn string_arg(vm: &VM, call: &NativeCall<'_>, index: usize) -> Result<String, Exception> {
    vm.to_string_value(&call.arg(index))
}

/// Integer argument with the guest's ToIntegerOrInfinity rules.
pub(crate) fn integer_arg(vm: &VM, call: &NativeCall<'_>, index: usize, default: f64) -> Result<f64, Exception> {
    match call.arg(index) {
        Value::Undefined => Ok(default),
        value => {
            let n = vm.to_number_value(&value)?;
            Ok(if n.is_nan() { 0.0 } else { n.trunc() })
        }
    }
}

/// Resolves a possibly negative relative index against `len`.
pub(crate) fn relative_index(index: f64, len: usize) -> usize {
    let len_f = len as f64;
    if index < 0.0 {
        (len_f + index).max(0.0) as usize
    } else {
        index.min(len_f) as usize
    }
}

pub(crate) fn type_error(vm: &VM, message: impl Into<String>) -> Exception {
    vm.throw_error(ErrorKind::TypeError, message)
}
