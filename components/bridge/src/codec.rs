//! Conversion of primitive values between the two runtimes.
//!
//! Integers outside the 32-bit range become guest doubles and lose
//! precision above 2^53. Guest `null` and `undefined` both become host
//! undef.

use core_types::Value;
use host_runtime::{latin1_to_string, HostValue};

/// Guest value for a host scalar; `None` for references.
pub fn scalar_to_guest(value: &HostValue) -> Option<Value> {
    Some(match value {
        HostValue::Undef => Value::Undefined,
        HostValue::Int(n) => Value::from_i64(*n),
        HostValue::Float(f) => Value::from_f64(*f),
        HostValue::Str(s) => Value::String(s.clone()),
        HostValue::Bytes(b) => Value::String(latin1_to_string(b)),
        HostValue::Ref(_) => return None,
    })
}

/// Host value for a guest primitive; `None` for objects.
pub fn primitive_to_host(value: &Value) -> Option<HostValue> {
    Some(match value {
        Value::Undefined | Value::Null => HostValue::Undef,
        Value::Boolean(b) => HostValue::Int(i64::from(*b)),
        Value::Smi(n) => HostValue::Int(i64::from(*n)),
        Value::Double(f) => match Value::from_f64(*f) {
            Value::Smi(n) => HostValue::Int(i64::from(n)),
            _ => HostValue::Float(*f),
        },
        Value::String(s) => HostValue::Str(s.clone()),
        Value::HeapObject(_) => return None,
    })
}
