//! Error constructors.

use super::{constructor, method, type_error, NativeResult};
use crate::realm::ERROR_NAMES;
use crate::vm::{NativeCall, VM};
use core_types::Value;

pub(super) fn install(vm: &VM) {
    let errors = vm.realm().errors;
    for (index, name) in ERROR_NAMES.iter().enumerate() {
        let proto = errors[index];
        constructor(vm, name, proto, move |vm, call| error_constructor(vm, call, index));
        vm.define_own(proto, "name", Value::String(name.to_string()), false);
        vm.define_own(proto, "message", Value::String(String::new()), false);
    }
    method(vm, errors[0], "toString", error_to_string);
}

fn error_constructor(vm: &VM, call: NativeCall<'_>, index: usize) -> NativeResult {
    // `new` on a script subclass passes an instance of the subclass prototype.
    let proto = match (&call.this, call.construct) {
        (Value::HeapObject(instance), true) => vm.prototype_of(*instance),
        _ => None,
    }
    .unwrap_or(vm.realm().errors[index]);
    let message = match call.arg(0) {
        Value::Undefined => None,
        other => Some(vm.to_string_value(&other)?),
    };
    let error = vm.new_error_with_prototype(proto, message.as_deref());
    Ok(Value::HeapObject(error))
}

fn error_to_string(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    if !matches!(call.this, Value::HeapObject(_)) {
        return Err(type_error(vm, "Error.prototype.toString called on non-object"));
    }
    let name = match vm.get_property(&call.this, "name")? {
        Value::Undefined => "Error".to_string(),
        other => vm.to_string_value(&other)?,
    };
    let message = match vm.get_property(&call.this, "message")? {
        Value::Undefined => String::new(),
        other => vm.to_string_value(&other)?,
    };
    Ok(Value::String(match (name.is_empty(), message.is_empty()) {
        (true, _) => message,
        (_, true) => name,
        _ => format!("{}: {}", name, message),
    }))
}
