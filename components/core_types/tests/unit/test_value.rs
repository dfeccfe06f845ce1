//! Unit tests for Value

use core_types::{number_to_string, string_to_number, ObjectId, Value};

#[test]
fn test_truthiness() {
    assert!(!Value::Undefined.is_truthy());
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Smi(0).is_truthy());
    assert!(!Value::Double(f64::NAN).is_truthy());
    assert!(!Value::String(String::new()).is_truthy());
    assert!(Value::String("0".into()).is_truthy());
    assert!(Value::HeapObject(ObjectId::new(0, 0)).is_truthy());
}

#[test]
fn test_type_of() {
    assert_eq!(Value::Null.type_of(), "object");
    assert_eq!(Value::Boolean(true).type_of(), "boolean");
    assert_eq!(Value::String("a".into()).type_of(), "string");
    assert_eq!(Value::Undefined.type_of(), "undefined");
}

#[test]
fn test_from_f64_normalizes_integral_values() {
    assert!(matches!(Value::from_f64(-2147483648.0), Value::Smi(i32::MIN)));
    assert!(matches!(Value::from_f64(1.5), Value::Double(_)));
    assert!(matches!(Value::from_f64(-2147483649.0), Value::Double(_)));
}

#[test]
fn test_display_numbers() {
    assert_eq!(Value::Double(2.5).to_string(), "2.5");
    assert_eq!(Value::Double(1e300).to_string(), "1e+300");
    assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
    assert_eq!(number_to_string(4294967296.0), "4294967296");
}

#[test]
fn test_to_number() {
    assert_eq!(Value::Boolean(true).to_number(), 1.0);
    assert_eq!(Value::Null.to_number(), 0.0);
    assert!(Value::Undefined.to_number().is_nan());
    assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    assert_eq!(string_to_number(""), 0.0);
}
