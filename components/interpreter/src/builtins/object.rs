//! `Object` constructor and `Object.prototype`.

use super::{constructor, method, type_error, NativeResult};
use crate::vm::{NativeCall, VM};
use core_types::Value;
use memory_manager::ObjectKind;

pub(super) fn install(vm: &VM) {
    let proto = vm.realm().object_prototype;
    let ctor = constructor(vm, "Object", proto, object_constructor);
    method(vm, ctor, "keys", object_keys);
    method(vm, ctor, "create", object_create);
    method(vm, ctor, "getPrototypeOf", object_get_prototype_of);
    method(vm, ctor, "setPrototypeOf", object_set_prototype_of);
    method(vm, ctor, "assign", object_assign);

    method(vm, proto, "hasOwnProperty", has_own_property);
    method(vm, proto, "toString", object_to_string);
    method(vm, proto, "valueOf", |_, call| Ok(call.this.clone()));
}

fn object_constructor(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    match call.arg(0) {
        Value::Undefined | Value::Null if call.construct => Ok(call.this.clone()),
        Value::Undefined | Value::Null => Ok(Value::HeapObject(vm.new_object())),
        other => Ok(other),
    }
}

fn object_keys(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let keys = match call.arg(0) {
        Value::Undefined | Value::Null => {
            return Err(type_error(vm, "Cannot convert undefined or null to object"))
        }
        Value::HeapObject(id) => vm.own_enumerable_keys(id),
        Value::String(s) => (0..s.encode_utf16().count()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    };
    let keys = keys.into_iter().map(Value::String).collect();
    Ok(Value::HeapObject(vm.new_array(keys)))
}

fn object_create(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let proto = match call.arg(0) {
        Value::Null => None,
        Value::HeapObject(id) => Some(id),
        other => {
            return Err(type_error(
                vm,
                format!("Object prototype may only be an Object or null: {}", vm.to_display_string(&other)),
            ))
        }
    };
    Ok(Value::HeapObject(vm.new_object_with_prototype(proto)))
}

fn object_get_prototype_of(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let realm = vm.realm();
    let proto = match call.arg(0) {
        Value::Undefined | Value::Null => {
            return Err(type_error(vm, "Cannot convert undefined or null to object"))
        }
        Value::HeapObject(id) => vm.prototype_of(id),
        Value::String(_) => Some(realm.string_prototype),
        Value::Smi(_) | Value::Double(_) => Some(realm.number_prototype),
        Value::Boolean(_) => Some(realm.boolean_prototype),
    };
    Ok(proto.map_or(Value::Null, Value::HeapObject))
}

fn object_set_prototype_of(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let target = call.arg(0);
    let proto = match call.arg(1) {
        Value::Null => None,
        Value::HeapObject(id) => Some(id),
        other => {
            return Err(type_error(
                vm,
                format!("Object prototype may only be an Object or null: {}", vm.to_display_string(&other)),
            ))
        }
    };
    if let Value::HeapObject(id) = target {
        if !vm.set_prototype(id, proto) {
            return Err(type_error(vm, "Cyclic __proto__ value"));
        }
    }
    Ok(target)
}

fn object_assign(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let target = call.arg(0);
    if target.is_nullish() {
        return Err(type_error(vm, "Cannot convert undefined or null to object"));
    }
    for source in call.args.iter().skip(1) {
        if let Value::HeapObject(id) = source {
            for key in vm.own_enumerable_keys(*id) {
                let value = vm.get_property(source, &key)?;
                vm.set_property(&target, &key, value)?;
            }
        }
    }
    Ok(target)
}

fn has_own_property(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let key = vm.to_property_key(&call.arg(0))?;
    Ok(Value::Boolean(match &call.this {
        Value::HeapObject(id) => vm.has_own_property(*id, &key),
        Value::String(s) => {
            key == "length"
                || key
                    .parse::<usize>()
                    .map_or(false, |i| i < s.encode_utf16().count())
        }
        Value::Undefined | Value::Null => {
            return Err(type_error(vm, "Cannot convert undefined or null to object"))
        }
        _ => false,
    }))
}

fn object_to_string(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let tag = match &call.this {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Boolean(_) => "Boolean",
        Value::Smi(_) | Value::Double(_) => "Number",
        Value::String(_) => "String",
        Value::HeapObject(id) => match vm.heap().get(*id).map(|o| &o.kind) {
            Some(ObjectKind::Array(_)) => "Array",
            Some(ObjectKind::Function(_)) => "Function",
            Some(ObjectKind::Error) => "Error",
            _ => "Object",
        },
    };
    Ok(Value::String(format!("[object {}]", tag)))
}
