//! `Array` constructor and `Array.prototype`.

use super::{constructor, integer_arg, method, relative_index, type_error, NativeResult};
use crate::exception::Exception;
use crate::ops::MAX_ARRAY_LENGTH;
use crate::vm::{NativeCall, VM};
use core_types::{ErrorKind, Value};

pub(super) fn install(vm: &VM) {
    let proto = vm.realm().array_prototype;
    let ctor = constructor(vm, "Array", proto, array_constructor);
    method(vm, ctor, "isArray", |vm, call| Ok(Value::Boolean(vm.is_array(&call.arg(0)))));

    method(vm, proto, "push", array_push);
    method(vm, proto, "pop", |vm, call| {
        with_elements(vm, &call, "pop", |e| e.pop().unwrap_or(Value::Undefined))
    });
    method(vm, proto, "shift", |vm, call| {
        with_elements(vm, &call, "shift", |e| {
            if e.is_empty() {
                Value::Undefined
            } else {
                e.remove(0)
            }
        })
    });
    method(vm, proto, "unshift", array_unshift);
    method(vm, proto, "reverse", |vm, call| {
        with_elements(vm, &call, "reverse", |e| e.reverse())?;
        Ok(call.this.clone())
    });
    method(vm, proto, "join", array_join);
    method(vm, proto, "toString", |vm, call| {
        if vm.is_array(&call.this) {
            array_join(vm, call)
        } else {
            Ok(Value::String("[object Object]".to_string()))
        }
    });
    method(vm, proto, "slice", array_slice);
    method(vm, proto, "indexOf", array_index_of);
    method(vm, proto, "concat", array_concat);
    method(vm, proto, "forEach", |vm, call| {
        iterate(vm, &call, "forEach", |_, _, _| Ok(()))?;
        Ok(Value::Undefined)
    });
    method(vm, proto, "map", |vm, call| {
        let mut out = Vec::new();
        iterate(vm, &call, "map", |_, _, result| {
            out.push(result);
            Ok(())
        })?;
        Ok(Value::HeapObject(vm.new_array(out)))
    });
    method(vm, proto, "filter", |vm, call| {
        let mut out = Vec::new();
        iterate(vm, &call, "filter", |_, element, result| {
            if result.is_truthy() {
                out.push(element);
            }
            Ok(())
        })?;
        Ok(Value::HeapObject(vm.new_array(out)))
    });
}

fn array_constructor(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let elements = match call.args {
        [Value::Smi(n)] if *n >= 0 && (*n as usize) <= MAX_ARRAY_LENGTH => {
            vec![Value::Undefined; *n as usize]
        }
        [Value::Smi(_)] | [Value::Double(_)] => {
            return Err(vm.throw_error(ErrorKind::RangeError, "Invalid array length"))
        }
        args => args.to_vec(),
    };
    Ok(Value::HeapObject(vm.new_array(elements)))
}

fn elements_of(vm: &VM, call: &NativeCall<'_>, name: &str) -> Result<Vec<Value>, Exception> {
    vm.array_elements(&call.this).ok_or_else(|| {
        type_error(vm, format!("Array.prototype.{} called on non-array", name))
    })
}

/// Runs `f` on the receiver's elements while the heap is borrowed.
fn with_elements<R>(
    vm: &VM,
    call: &NativeCall<'_>,
    name: &str,
    f: impl FnOnce(&mut Vec<Value>) -> R,
) -> Result<R, Exception> {
    let result = call.this.as_object().and_then(|id| {
        let mut heap = vm.heap_mut();
        heap.get_mut(id)?.elements_mut().map(f)
    });
    result.ok_or_else(|| type_error(vm, format!("Array.prototype.{} called on non-array", name)))
}

fn array_push(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let len = with_elements(vm, &call, "push", |e| {
        e.extend_from_slice(call.args);
        e.len()
    })?;
    Ok(Value::from_i64(len as i64))
}

fn array_unshift(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let len = with_elements(vm, &call, "unshift", |e| {
        e.splice(0..0, call.args.iter().cloned());
        e.len()
    })?;
    Ok(Value::from_i64(len as i64))
}

fn array_join(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let elements = elements_of(vm, &call, "join")?;
    let separator = match call.arg(0) {
        Value::Undefined => ",".to_string(),
        other => vm.to_string_value(&other)?,
    };
    let mut parts = Vec::with_capacity(elements.len());
    for element in &elements {
        parts.push(match element {
            Value::Undefined | Value::Null => String::new(),
            other => vm.to_string_value(other)?,
        });
    }
    Ok(Value::String(parts.join(&separator)))
}

fn array_slice(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let elements = elements_of(vm, &call, "slice")?;
    let len = elements.len();
    let start = relative_index(integer_arg(vm, &call, 0, 0.0)?, len);
    let end = relative_index(integer_arg(vm, &call, 1, len as f64)?, len);
    let slice = if start < end {
        elements[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(Value::HeapObject(vm.new_array(slice)))
}

fn array_index_of(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let elements = elements_of(vm, &call, "indexOf")?;
    let needle = call.arg(0);
    let from = relative_index(integer_arg(vm, &call, 1, 0.0)?, elements.len());
    let found = elements
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, e)| **e == needle)
        .map_or(-1, |(i, _)| i as i64);
    Ok(Value::from_i64(found))
}

fn array_concat(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let mut out = elements_of(vm, &call, "concat")?;
    for arg in call.args {
        match vm.array_elements(arg) {
            Some(elements) => out.extend(elements),
            None => out.push(arg.clone()),
        }
    }
    Ok(Value::HeapObject(vm.new_array(out)))
}

/// Calls the callback argument for each element, re-reading the length
/// every step.
fn iterate(
    vm: &VM,
    call: &NativeCall<'_>,
    name: &str,
    mut sink: impl FnMut(usize, Value, Value) -> Result<(), Exception>,
) -> Result<(), Exception> {
    elements_of(vm, call, name)?;
    let callback = call.arg(0);
    if !vm.is_callable(&callback) {
        return Err(type_error(
            vm,
            format!("{} is not a function", vm.to_display_string(&callback)),
        ));
    }
    let this_arg = call.arg(1);
    let Some(array) = call.this.as_object() else {
        return Ok(());
    };
    let mut index = 0;
    loop {
        let element = {
            let heap = vm.heap();
            heap.get(array)
                .and_then(|o| o.elements())
                .and_then(|e| e.get(index).cloned())
        };
        let Some(element) = element else {
            break;
        };
        let result = vm.call_function(
            &callback,
            this_arg.clone(),
            &[element.clone(), Value::from_i64(index as i64), call.this.clone()],
        )?;
        sink(index, element, result)?;
        index += 1;
    }
    Ok(())
}
