//! Global value properties and functions.

use super::{method, number_arg, string_arg, NativeResult};
use crate::vm::{NativeCall, VM};
use core_types::Value;

pub(super) fn install(vm: &VM) {
    let global = vm.global_object();
    vm.define_own(global, "NaN", Value::Double(f64::NAN), false);
    vm.define_own(global, "Infinity", Value::Double(f64::INFINITY), false);
    vm.define_own(global, "undefined", Value::Undefined, false);
    vm.define_own(global, "globalThis", Value::HeapObject(global), false);
    method(vm, global, "parseInt", parse_int);
    method(vm, global, "parseFloat", |vm, call| {
        Ok(Value::from_f64(parse_float(&string_arg(vm, &call, 0)?)))
    });
    method(vm, global, "isNaN", |vm, call| {
        Ok(Value::Boolean(number_arg(vm, &call, 0)?.is_nan()))
    });
    method(vm, global, "isFinite", |vm, call| {
        Ok(Value::Boolean(number_arg(vm, &call, 0)?.is_finite()))
    });
}

fn parse_int(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let input = string_arg(vm, &call, 0)?;
    let radix = crate::ops::to_int32(number_arg(vm, &call, 1)?);
    Ok(Value::from_f64(parse_int_radix(&input, radix)))
}

fn parse_int_radix(input: &str, radix: i32) -> f64 {
    let mut s = input.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    let mut radix = radix;
    let has_hex_prefix = s.starts_with("0x") || s.starts_with("0X");
    if radix == 0 {
        radix = if has_hex_prefix { 16 } else { 10 };
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    if radix == 16 && has_hex_prefix {
        s = &s[2..];
    }
    let mut value = 0.0;
    let mut any = false;
    for c in s.chars() {
        let Some(digit) = c.to_digit(radix as u32) else {
            break;
        };
        value = value * f64::from(radix) + f64::from(digit);
        any = true;
    }
    if any {
        sign * value
    } else {
        f64::NAN
    }
}

/// Parses the longest decimal literal prefix of `input`.
fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    let unsigned = s.trim_start_matches(['+', '-']);
    if unsigned.starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || &s[digits_start..end] == "." {
        return f64::NAN;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse().unwrap_or(f64::NAN)
}
