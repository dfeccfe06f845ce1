//! `String` constructor and `String.prototype`.
//!
//! Indices count UTF-16 code units.

use super::{constructor, integer_arg, method, number_arg, relative_index, string_arg, type_error, NativeResult};
use crate::exception::Exception;
use crate::vm::{NativeCall, VM};
use core_types::Value;

pub(super) fn install(vm: &VM) {
    let proto = vm.realm().string_prototype;
    let ctor = constructor(vm, "String", proto, |vm, call| match call.args.first() {
        None => Ok(Value::String(String::new())),
        Some(value) => Ok(Value::String(vm.to_string_value(value)?)),
    });
    method(vm, ctor, "fromCharCode", |vm, call| {
        let mut units = Vec::with_capacity(call.args.len());
        for value in call.args {
            units.push(crate::ops::to_uint32(vm.to_number_value(value)?) as u16);
        }
        Ok(Value::String(String::from_utf16_lossy(&units)))
    });

    method(vm, proto, "toString", |vm, call| this_string(vm, &call, "toString").map(Value::String));
    method(vm, proto, "valueOf", |vm, call| this_string(vm, &call, "valueOf").map(Value::String));
    method(vm, proto, "charAt", string_char_at);
    method(vm, proto, "charCodeAt", string_char_code_at);
    method(vm, proto, "indexOf", string_index_of);
    method(vm, proto, "slice", string_slice);
    method(vm, proto, "substring", string_substring);
    method(vm, proto, "toUpperCase", |vm, call| {
        Ok(Value::String(this_string(vm, &call, "toUpperCase")?.to_uppercase()))
    });
    method(vm, proto, "toLowerCase", |vm, call| {
        Ok(Value::String(this_string(vm, &call, "toLowerCase")?.to_lowercase()))
    });
    method(vm, proto, "trim", |vm, call| {
        Ok(Value::String(this_string(vm, &call, "trim")?.trim().to_string()))
    });
    method(vm, proto, "split", string_split);
    method(vm, proto, "concat", |vm, call| {
        let mut out = this_string(vm, &call, "concat")?;
        for arg in call.args {
            out.push_str(&vm.to_string_value(arg)?);
        }
        Ok(Value::String(out))
    });
    method(vm, proto, "replace", string_replace);
}

fn this_string(vm: &VM, call: &NativeCall<'_>, name: &str) -> Result<String, Exception> {
    match &call.this {
        Value::String(s) => Ok(s.clone()),
        Value::Undefined | Value::Null => Err(type_error(
            vm,
            format!("String.prototype.{} called on null or undefined", name),
        )),
        other => vm.to_string_value(other),
    }
}

fn units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

fn string_char_at(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let s = units(&this_string(vm, &call, "charAt")?);
    let index = integer_arg(vm, &call, 0, 0.0)?;
    Ok(Value::String(if index >= 0.0 && (index as usize) < s.len() {
        from_units(&s[index as usize..index as usize + 1])
    } else {
        String::new()
    }))
}

fn string_char_code_at(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let s = units(&this_string(vm, &call, "charCodeAt")?);
    let index = integer_arg(vm, &call, 0, 0.0)?;
    Ok(if index >= 0.0 && (index as usize) < s.len() {
        Value::Smi(i32::from(s[index as usize]))
    } else {
        Value::Double(f64::NAN)
    })
}

fn string_index_of(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let s = units(&this_string(vm, &call, "indexOf")?);
    let needle = units(&string_arg(vm, &call, 0)?);
    let from = relative_index(integer_arg(vm, &call, 1, 0.0)?.max(0.0), s.len());
    if needle.is_empty() {
        return Ok(Value::from_i64(from as i64));
    }
    let found = (from..s.len())
        .find(|&i| s[i..].starts_with(&needle))
        .map_or(-1, |i| i as i64);
    Ok(Value::from_i64(found))
}

fn string_slice(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let s = units(&this_string(vm, &call, "slice")?);
    let start = relative_index(integer_arg(vm, &call, 0, 0.0)?, s.len());
    let end = relative_index(integer_arg(vm, &call, 1, s.len() as f64)?, s.len());
    Ok(Value::String(if start < end {
        from_units(&s[start..end])
    } else {
        String::new()
    }))
}

fn string_substring(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let s = units(&this_string(vm, &call, "substring")?);
    let clamp = |n: f64| n.max(0.0).min(s.len() as f64) as usize;
    let a = clamp(integer_arg(vm, &call, 0, 0.0)?);
    let b = clamp(integer_arg(vm, &call, 1, s.len() as f64)?);
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    Ok(Value::String(from_units(&s[start..end])))
}

fn string_split(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let s = this_string(vm, &call, "split")?;
    let limit = match call.arg(1) {
        Value::Undefined => usize::MAX,
        _ => crate::ops::to_uint32(number_arg(vm, &call, 1)?) as usize,
    };
    let parts: Vec<String> = match call.arg(0) {
        Value::Undefined => vec![s],
        separator => {
            let separator = vm.to_string_value(&separator)?;
            if separator.is_empty() {
                units(&s).iter().map(|u| from_units(&[*u])).collect()
            } else {
                s.split(separator.as_str()).map(str::to_string).collect()
            }
        }
    };
    let parts = parts.into_iter().take(limit).map(Value::String).collect();
    Ok(Value::HeapObject(vm.new_array(parts)))
}

/// Replaces the first occurrence of a string pattern. A function
/// replacement receives the match, its offset and the whole string.
fn string_replace(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let s = this_string(vm, &call, "replace")?;
    let pattern = string_arg(vm, &call, 0)?;
    let Some(position) = s.find(&pattern) else {
        return Ok(Value::String(s));
    };
    let replacement = call.arg(1);
    let replacement = if vm.is_callable(&replacement) {
        let offset = s[..position].encode_utf16().count() as i64;
        let result = vm.call_function(
            &replacement,
            Value::Undefined,
            &[
                Value::String(pattern.clone()),
                Value::from_i64(offset),
                Value::String(s.clone()),
            ],
        )?;
        vm.to_string_value(&result)?
    } else {
        vm.to_string_value(&replacement)?
    };
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..position]);
    out.push_str(&replacement);
    out.push_str(&s[position + pattern.len()..]);
    Ok(Value::String(out))
}
