//! Property access, type conversion and operator semantics.

use crate::exception::Exception;
use crate::vm::VM;
use core_types::{number_to_string, ErrorKind, ObjectId, Value};
use memory_manager::ObjectKind;
use std::collections::HashSet;

/// Arrays grow at most this far past their end on a single index store.
const MAX_ARRAY_GAP: usize = 1 << 20;

/// Longest array a script may create.
pub(crate) const MAX_ARRAY_LENGTH: usize = 1 << 24;

/// Parses a canonical array index (`"0"`, `"17"`, not `"01"` or `"-1"`).
pub(crate) fn array_index(key: &str) -> Option<usize> {
    let bytes = key.as_bytes();
    if bytes.is_empty() || bytes.len() > 10 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    let index: u64 = key.parse().ok()?;
    (index < u64::from(u32::MAX)).then_some(index as usize)
}

/// ToInt32.
pub(crate) fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// ToUint32.
pub(crate) fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// Exponentiation with the guest's NaN rules.
pub(crate) fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

/// Preferred type for object to primitive conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// No preference (`+`, `==`)
    Default,
    /// Numeric context
    Number,
    /// String context
    String,
}

enum Store {
    Done,
    Property,
    BadLength,
}

impl VM {
    // ----- properties -----

    /// Reads `key` from `target`, walking the prototype chain.
    ///
    /// Primitives read from their wrapper prototypes; `undefined` and `null`
    /// throw a `TypeError`.
    pub fn get_property(&self, target: &Value, key: &str) -> Result<Value, Exception> {
        let start = match target {
            Value::Undefined | Value::Null => {
                return Err(self.throw_error(
                    ErrorKind::TypeError,
                    format!("Cannot read properties of {} (reading '{}')", target, key),
                ))
            }
            Value::String(s) => {
                if key == "length" {
                    return Ok(Value::from_i64(s.encode_utf16().count() as i64));
                }
                if let Some(index) = array_index(key) {
                    let unit = s.encode_utf16().nth(index);
                    return Ok(unit.map_or(Value::Undefined, |u| {
                        Value::String(String::from_utf16_lossy(&[u]))
                    }));
                }
                self.realm().string_prototype
            }
            Value::Smi(_) | Value::Double(_) => self.realm().number_prototype,
            Value::Boolean(_) => self.realm().boolean_prototype,
            Value::HeapObject(id) => *id,
        };
        Ok(self.lookup(start, key))
    }

    /// Reads `key` from object `id` or its prototypes. Object properties
    /// are plain data, so the read cannot throw.
    pub fn object_property(&self, id: ObjectId, key: &str) -> Value {
        self.lookup(id, key)
    }

    fn lookup(&self, start: ObjectId, key: &str) -> Value {
        let heap = self.heap();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let Some(object) = heap.get(id) else {
                break;
            };
            match &object.kind {
                ObjectKind::Array(elements) => {
                    if key == "length" {
                        return Value::from_i64(elements.len() as i64);
                    }
                    if let Some(index) = array_index(key) {
                        if let Some(value) = elements.get(index) {
                            return value.clone();
                        }
                    }
                }
                ObjectKind::Function(data) if key == "name" => {
                    if !object.properties.contains("name") {
                        return Value::String(data.name.clone());
                    }
                }
                _ => {}
            }
            if let Some(property) = object.properties.get(key) {
                return property.value.clone();
            }
            cursor = object.prototype;
        }
        Value::Undefined
    }

    /// Writes `key` on `target`. Stores on primitives are ignored.
    pub fn set_property(&self, target: &Value, key: &str, value: Value) -> Result<(), Exception> {
        match target {
            Value::Undefined | Value::Null => Err(self.throw_error(
                ErrorKind::TypeError,
                format!("Cannot set properties of {} (setting '{}')", target, key),
            )),
            Value::HeapObject(id) => self.store(*id, key, value),
            _ => Ok(()),
        }
    }

    fn store(&self, id: ObjectId, key: &str, value: Value) -> Result<(), Exception> {
        let outcome = {
            let mut heap = self.heap_mut();
            let Some(object) = heap.get_mut(id) else {
                return Ok(());
            };
            let outcome = match object.elements_mut() {
                Some(elements) if key == "length" => match value.as_f64() {
                    Some(n) if n >= 0.0 && n.fract() == 0.0 && (n as usize) <= MAX_ARRAY_LENGTH => {
                        elements.resize(n as usize, Value::Undefined);
                        Store::Done
                    }
                    _ => Store::BadLength,
                },
                Some(elements) => match array_index(key) {
                    Some(index) if index < elements.len() => {
                        elements[index] = value.clone();
                        Store::Done
                    }
                    Some(index) if index - elements.len() <= MAX_ARRAY_GAP => {
                        elements.resize(index, Value::Undefined);
                        elements.push(value.clone());
                        Store::Done
                    }
                    _ => Store::Property,
                },
                None => Store::Property,
            };
            if let Store::Property = outcome {
                object.properties.insert(key.to_string(), value, true);
            }
            outcome
        };
        match outcome {
            Store::BadLength => Err(self.throw_error(ErrorKind::RangeError, "Invalid array length")),
            Store::Done | Store::Property => Ok(()),
        }
    }

    /// Whether `key` is found on `id` or its prototypes.
    pub fn has_property(&self, id: ObjectId, key: &str) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.has_own_property(current, key) {
                return true;
            }
            cursor = self.prototype_of(current);
        }
        false
    }

    /// Deletes an own property. Array elements become holes.
    pub fn delete_property(&self, id: ObjectId, key: &str) -> bool {
        let mut heap = self.heap_mut();
        let Some(object) = heap.get_mut(id) else {
            return true;
        };
        if let Some(elements) = object.elements_mut() {
            if key == "length" {
                return false;
            }
            if let Some(index) = array_index(key) {
                if let Some(slot) = elements.get_mut(index) {
                    *slot = Value::Undefined;
                }
                return true;
            }
        }
        object.properties.remove(key);
        true
    }

    /// Own enumerable keys in enumeration order: array indices first, then
    /// named properties in insertion order.
    pub fn own_enumerable_keys(&self, id: ObjectId) -> Vec<String> {
        let heap = self.heap();
        let Some(object) = heap.get(id) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = match object.elements() {
            Some(elements) => (0..elements.len()).map(|i| i.to_string()).collect(),
            None => Vec::new(),
        };
        keys.extend(
            object
                .properties
                .iter()
                .filter(|(_, p)| p.enumerable)
                .map(|(k, _)| k.to_string()),
        );
        keys
    }

    /// Enumerable keys of `id` and its prototype chain, as `for-in` visits
    /// them.
    pub fn enumerable_keys_with_prototypes(&self, id: ObjectId) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            for key in self.own_enumerable_keys(current) {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
            cursor = self.prototype_of(current);
        }
        keys
    }

    // ----- conversions -----

    /// `typeof` result.
    pub fn type_of(&self, value: &Value) -> String {
        if self.is_callable(value) {
            "function".to_string()
        } else {
            value.type_of()
        }
    }

    /// Converts objects to primitives by calling `valueOf`/`toString`.
    pub fn to_primitive(&self, value: &Value, hint: Hint) -> Result<Value, Exception> {
        if !matches!(value, Value::HeapObject(_)) {
            return Ok(value.clone());
        }
        let order = match hint {
            Hint::String => ["toString", "valueOf"],
            Hint::Default | Hint::Number => ["valueOf", "toString"],
        };
        for method in order {
            let function = self.get_property(value, method)?;
            if self.is_callable(&function) {
                let result = self.call_function(&function, value.clone(), &[])?;
                if !matches!(result, Value::HeapObject(_)) {
                    return Ok(result);
                }
            }
        }
        Err(self.throw_error(ErrorKind::TypeError, "Cannot convert object to primitive value"))
    }

    /// ToString.
    pub fn to_string_value(&self, value: &Value) -> Result<String, Exception> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::HeapObject(_) => {
                let primitive = self.to_primitive(value, Hint::String)?;
                Ok(primitive.to_string())
            }
            other => Ok(other.to_string()),
        }
    }

    /// ToString that never fails; used for diagnostics.
    pub fn to_display_string(&self, value: &Value) -> String {
        match self.to_string_value(value) {
            Ok(s) => s,
            Err(_) if self.is_callable(value) => "function".to_string(),
            Err(_) => value.to_string(),
        }
    }

    /// ToNumber.
    pub fn to_number_value(&self, value: &Value) -> Result<f64, Exception> {
        match value {
            Value::HeapObject(_) => {
                let primitive = self.to_primitive(value, Hint::Number)?;
                Ok(primitive.to_number())
            }
            other => Ok(other.to_number()),
        }
    }

    /// ToPropertyKey.
    pub fn to_property_key(&self, value: &Value) -> Result<String, Exception> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Smi(n) => Ok(n.to_string()),
            Value::Double(n) => Ok(number_to_string(*n)),
            other => self.to_string_value(other),
        }
    }

    // ----- operators -----

    pub(crate) fn add_values(&self, lhs: &Value, rhs: &Value) -> Result<Value, Exception> {
        if let (Value::Smi(a), Value::Smi(b)) = (lhs, rhs) {
            return Ok(Value::from_i64(i64::from(*a) + i64::from(*b)));
        }
        let lhs = self.to_primitive(lhs, Hint::Default)?;
        let rhs = self.to_primitive(rhs, Hint::Default)?;
        if matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_)) {
            let mut out = self.to_string_value(&lhs)?;
            out.push_str(&self.to_string_value(&rhs)?);
            return Ok(Value::String(out));
        }
        Ok(Value::from_f64(lhs.to_number() + rhs.to_number()))
    }

    /// `lhs < rhs`; `None` when either side is `NaN`.
    pub(crate) fn compare(&self, lhs: &Value, rhs: &Value, left_first: bool) -> Result<Option<bool>, Exception> {
        let (lhs, rhs) = if left_first {
            let l = self.to_primitive(lhs, Hint::Number)?;
            (l, self.to_primitive(rhs, Hint::Number)?)
        } else {
            let r = self.to_primitive(rhs, Hint::Number)?;
            (self.to_primitive(lhs, Hint::Number)?, r)
        };
        if let (Value::String(a), Value::String(b)) = (&lhs, &rhs) {
            return Ok(Some(a.encode_utf16().lt(b.encode_utf16())));
        }
        let (a, b) = (lhs.to_number(), rhs.to_number());
        if a.is_nan() || b.is_nan() {
            return Ok(None);
        }
        Ok(Some(a < b))
    }

    /// Abstract equality (`==`).
    pub fn loose_equals(&self, lhs: &Value, rhs: &Value) -> Result<bool, Exception> {
        Ok(match (lhs, rhs) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::HeapObject(a), Value::HeapObject(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(_), _) => {
                return self.loose_equals(&Value::from_f64(lhs.to_number()), rhs)
            }
            (_, Value::Boolean(_)) => {
                return self.loose_equals(lhs, &Value::from_f64(rhs.to_number()))
            }
            (Value::HeapObject(_), _) => {
                let primitive = self.to_primitive(lhs, Hint::Default)?;
                return self.loose_equals(&primitive, rhs);
            }
            (_, Value::HeapObject(_)) => {
                let primitive = self.to_primitive(rhs, Hint::Default)?;
                return self.loose_equals(lhs, &primitive);
            }
            _ => lhs.to_number() == rhs.to_number(),
        })
    }

    /// `value instanceof constructor`.
    pub fn instance_of(&self, value: &Value, constructor: &Value) -> Result<bool, Exception> {
        if !self.is_callable(constructor) {
            return Err(self.throw_error(
                ErrorKind::TypeError,
                "Right-hand side of 'instanceof' is not callable",
            ));
        }
        let Value::HeapObject(id) = value else {
            return Ok(false);
        };
        let Value::HeapObject(prototype) = self.get_property(constructor, "prototype")? else {
            return Err(self.throw_error(
                ErrorKind::TypeError,
                "Function has non-object prototype in instanceof check",
            ));
        };
        let mut cursor = self.prototype_of(*id);
        while let Some(current) = cursor {
            if current == prototype {
                return Ok(true);
            }
            cursor = self.prototype_of(current);
        }
        Ok(false)
    }
}
