//! The `Math` namespace.

use super::{method, number_arg, NativeResult};
use crate::vm::{NativeCall, VM};
use core_types::Value;
use std::collections::hash_map::RandomState;
use std::f64::consts;
use std::hash::{BuildHasher, Hasher};

pub(super) fn install(vm: &VM) {
    let math = vm.new_object();
    vm.define_own(vm.global_object(), "Math", Value::HeapObject(math), false);
    for (name, value) in [
        ("PI", consts::PI),
        ("E", consts::E),
        ("LN2", consts::LN_2),
        ("LN10", consts::LN_10),
        ("SQRT2", consts::SQRT_2),
    ] {
        vm.define_own(math, name, Value::Double(value), false);
    }

    let unary: [(&str, fn(f64) -> f64); 13] = [
        ("abs", f64::abs),
        ("floor", f64::floor),
        ("ceil", f64::ceil),
        ("round", round),
        ("trunc", f64::trunc),
        ("sign", sign),
        ("sqrt", f64::sqrt),
        ("log", f64::ln),
        ("exp", f64::exp),
        ("sin", f64::sin),
        ("cos", f64::cos),
        ("tan", f64::tan),
        ("atan", f64::atan),
    ];
    for (name, f) in unary {
        method(vm, math, name, move |vm, call| {
            Ok(Value::from_f64(f(number_arg(vm, &call, 0)?)))
        });
    }
    method(vm, math, "pow", |vm, call| {
        let base = number_arg(vm, &call, 0)?;
        let exponent = number_arg(vm, &call, 1)?;
        Ok(Value::from_f64(crate::ops::power(base, exponent)))
    });
    method(vm, math, "atan2", |vm, call| {
        let y = number_arg(vm, &call, 0)?;
        let x = number_arg(vm, &call, 1)?;
        Ok(Value::from_f64(y.atan2(x)))
    });
    method(vm, math, "max", |vm, call| fold(vm, call, f64::NEG_INFINITY, f64::max));
    method(vm, math, "min", |vm, call| fold(vm, call, f64::INFINITY, f64::min));
    method(vm, math, "random", |_, _| Ok(Value::Double(random())));
}

/// Rounds half up, like the guest's `Math.round`.
fn round(x: f64) -> f64 {
    if !x.is_finite() || x.fract() == 0.0 {
        return x;
    }
    (x + 0.5).floor()
}

fn sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 {
        x
    } else {
        x.signum()
    }
}

fn fold(vm: &VM, call: NativeCall<'_>, init: f64, pick: fn(f64, f64) -> f64) -> NativeResult {
    let mut acc = init;
    for value in call.args {
        let n = vm.to_number_value(value)?;
        if n.is_nan() {
            return Ok(Value::Double(f64::NAN));
        }
        acc = pick(acc, n);
    }
    Ok(Value::from_f64(acc))
}

/// Uniform double in `[0, 1)` from the randomly keyed std hasher.
fn random() -> f64 {
    let bits = RandomState::new().build_hasher().finish();
    (bits >> 11) as f64 / (1u64 << 53) as f64
}
