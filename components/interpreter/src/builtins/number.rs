//! `Number` and `Boolean`.

use super::{constructor, integer_arg, method, type_error, NativeResult};
use crate::exception::Exception;
use crate::vm::{NativeCall, VM};
use core_types::{number_to_string, ErrorKind, Value};

pub(super) fn install(vm: &VM) {
    let proto = vm.realm().number_prototype;
    let ctor = constructor(vm, "Number", proto, |vm, call| match call.args.first() {
        None => Ok(Value::Smi(0)),
        Some(value) => Ok(Value::from_f64(vm.to_number_value(value)?)),
    });
    vm.define_own(ctor, "MAX_SAFE_INTEGER", Value::Double(9_007_199_254_740_991.0), false);
    vm.define_own(ctor, "MIN_SAFE_INTEGER", Value::Double(-9_007_199_254_740_991.0), false);
    vm.define_own(ctor, "EPSILON", Value::Double(f64::EPSILON), false);
    vm.define_own(ctor, "NaN", Value::Double(f64::NAN), false);
    method(vm, ctor, "isInteger", |_, call| {
        Ok(Value::Boolean(
            call.arg(0).as_f64().map_or(false, |n| n.is_finite() && n.fract() == 0.0),
        ))
    });
    method(vm, proto, "toString", number_to_string_method);
    method(vm, proto, "toFixed", number_to_fixed);
    method(vm, proto, "valueOf", |vm, call| {
        this_number(vm, &call, "valueOf").map(Value::from_f64)
    });

    let proto = vm.realm().boolean_prototype;
    constructor(vm, "Boolean", proto, |_, call| Ok(Value::Boolean(call.arg(0).is_truthy())));
    method(vm, proto, "toString", |vm, call| match call.this {
        Value::Boolean(b) => Ok(Value::String(b.to_string())),
        _ => Err(type_error(vm, "Boolean.prototype.toString requires that 'this' be a Boolean")),
    });
    method(vm, proto, "valueOf", |vm, call| match call.this {
        Value::Boolean(b) => Ok(Value::Boolean(b)),
        _ => Err(type_error(vm, "Boolean.prototype.valueOf requires that 'this' be a Boolean")),
    });
}

fn this_number(vm: &VM, call: &NativeCall<'_>, name: &str) -> Result<f64, Exception> {
    call.this.as_f64().ok_or_else(|| {
        type_error(
            vm,
            format!("Number.prototype.{} requires that 'this' be a Number", name),
        )
    })
}

fn number_to_string_method(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let n = this_number(vm, &call, "toString")?;
    let radix = integer_arg(vm, &call, 0, 10.0)?;
    if !(2.0..=36.0).contains(&radix) {
        return Err(vm.throw_error(
            ErrorKind::RangeError,
            "toString() radix must be between 2 and 36",
        ));
    }
    if radix == 10.0 || !n.is_finite() {
        return Ok(Value::String(number_to_string(n)));
    }
    Ok(Value::String(integer_to_radix(n.trunc(), radix as u32)))
}

/// Integral part of `n` in `radix`.
fn integer_to_radix(n: f64, radix: u32) -> String {
    let negative = n < 0.0;
    let mut value = n.abs();
    let mut digits = Vec::new();
    while value >= 1.0 {
        let digit = (value % f64::from(radix)) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
        value = (value / f64::from(radix)).trunc();
    }
    if digits.is_empty() {
        digits.push('0');
    }
    if negative {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn number_to_fixed(vm: &VM, call: NativeCall<'_>) -> NativeResult {
    let n = this_number(vm, &call, "toFixed")?;
    let digits = integer_arg(vm, &call, 0, 0.0)?;
    if !(0.0..=100.0).contains(&digits) {
        return Err(vm.throw_error(
            ErrorKind::RangeError,
            "toFixed() digits argument must be between 0 and 100",
        ));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(Value::String(number_to_string(n)));
    }
    Ok(Value::String(format!("{:.*}", digits as usize, n)))
}
