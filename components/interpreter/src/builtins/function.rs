//! `Function.prototype`.

use super::{constructor, method, type_error, NativeResult};
use crate::vm::{NativeCall, VM};
use core_types::Value;
use memory_manager::FunctionCode;

pub(super) fn install(vm: &VM) {
    let proto = vm.realm().function_prototype;
    constructor(vm, "Function", proto, |vm, _| {
        Err(type_error(vm, "Code generation from strings is not supported"))
    });
    method(vm, proto, "call", function_call);
    method(vm, proto, "apply", function_apply);
    method(vm, proto, "bind", function_bind);
    method(vm, proto, "toString", function_to_string);
}

fn function_call(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let rest = call.args.get(1..).unwrap_or(&[]);
    vm.call_function(&call.this, call.arg(0), rest)
}

fn function_apply(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let args = match call.arg(1) {
        Value::Undefined | Value::Null => Vec::new(),
        list => match vm.array_elements(&list) {
            Some(elements) => elements,
            None => return Err(type_error(vm, "CreateListFromArrayLike called on non-object")),
        },
    };
    vm.call_function(&call.this, call.arg(0), &args)
}

/// Bound functions keep their target, receiver and leading arguments in
/// internal slots, in that order.
fn function_bind(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    if !vm.is_callable(&call.this) {
        return Err(type_error(vm, "Bind must be called on a function"));
    }
    let name = call
        .this
        .as_object()
        .and_then(|id| vm.function_name(id))
        .unwrap_or_default();
    let bound = vm.create_native_function(&format!("bound {}", name), |vm, call| {
        let slots = vm
            .heap()
            .get(call.callee)
            .map(|o| o.internal_slots.clone())
            .unwrap_or_default();
        let (target, this) = match slots.as_slice() {
            [target, this, ..] => (target.clone(), this.clone()),
            _ => return Err(type_error(vm, "bound function lost its target")),
        };
        let mut args = slots[2..].to_vec();
        args.extend_from_slice(call.args);
        vm.call_function(&target, this, &args)
    });
    if let Some(object) = vm.heap_mut().get_mut(bound) {
        object.internal_slots.push(call.this.clone());
        object.internal_slots.push(call.arg(0));
        object
            .internal_slots
            .extend(call.args.iter().skip(1).cloned());
    }
    Ok(Value::HeapObject(bound))
}

fn function_to_string(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let Some(id) = call.this.as_object() else {
        return Err(type_error(vm, "Function.prototype.toString requires that 'this' be a Function"));
    };
    let heap = vm.heap();
    let Some(data) = heap.get(id).and_then(|o| o.function()) else {
        drop(heap);
        return Err(type_error(vm, "Function.prototype.toString requires that 'this' be a Function"));
    };
    let body = match data.code {
        FunctionCode::Native(_) => "[native code]",
        FunctionCode::Script(_) => "...",
    };
    let text = format!("function {}() {{ {} }}", data.name, body);
    Ok(Value::String(text))
}
