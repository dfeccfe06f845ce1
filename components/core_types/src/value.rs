//! Guest value representation.
//!
//! Primitive values are stored inline, while objects, arrays and functions
//! live in the guest heap and are referenced by an [`ObjectId`].

use crate::ObjectId;
use std::fmt;

/// Represents any guest script value.
///
/// Numbers have two representations: integral values that fit in 32 bits are
/// kept as [`Value::Smi`], everything else as [`Value::Double`]. Use
/// [`Value::from_f64`] to get the canonical form of an arithmetic result.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let undefined = Value::Undefined;
/// let number = Value::Smi(42);
/// let float = Value::Double(3.14);
///
/// assert!(!undefined.is_truthy());
/// assert!(number.is_truthy());
/// assert_eq!(float.type_of(), "number");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// The `undefined` value
    Undefined,
    /// The `null` value
    Null,
    /// Boolean `true` or `false`
    Boolean(bool),
    /// Small integer (fits in 32 bits)
    Smi(i32),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// String value
    String(String),
    /// Heap-allocated object, array or function
    HeapObject(ObjectId),
}

impl PartialEq for Value {
    /// Structural equality; numbers compare by value across representations.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::HeapObject(a), Value::HeapObject(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl Value {
    /// Canonical number value: integral values inside the `i32` range become
    /// [`Value::Smi`], except negative zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(matches!(Value::from_f64(2147483647.0), Value::Smi(2147483647)));
    /// assert!(matches!(Value::from_f64(2147483648.0), Value::Double(_)));
    /// assert!(matches!(Value::from_f64(-0.0), Value::Double(_)));
    /// ```
    pub fn from_f64(n: f64) -> Self {
        if n.fract() == 0.0
            && n >= i32::MIN as f64
            && n <= i32::MAX as f64
            && !(n == 0.0 && n.is_sign_negative())
        {
            Value::Smi(n as i32)
        } else {
            Value::Double(n)
        }
    }

    /// Number value for a 64-bit integer, as `i32` when it fits.
    pub fn from_i64(n: i64) -> Self {
        match i32::try_from(n) {
            Ok(small) => Value::Smi(small),
            Err(_) => Value::Double(n as f64),
        }
    }

    /// Returns whether this value is truthy.
    ///
    /// `undefined`, `null`, `false`, `0`, `-0`, `NaN` and `""` are falsy;
    /// every object is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Smi(n) => *n != 0,
            Value::Double(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::HeapObject(_) => true,
        }
    }

    /// The `typeof` result for primitives; heap objects report `"object"`.
    ///
    /// The engine refines this to `"function"` for callable objects.
    pub fn type_of(&self) -> String {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Smi(_) | Value::Double(_) => "number",
            Value::String(_) => "string",
            Value::HeapObject(_) => "object",
        }
        .to_string()
    }

    /// Numeric value if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Smi(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Object handle if this is a heap object.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::HeapObject(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether this is `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Numeric conversion of a primitive; objects convert to `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Smi(n) => *n as f64,
            Value::Double(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::HeapObject(_) => f64::NAN,
        }
    }
}

/// Formats a number the way the guest language prints it.
///
/// # Examples
///
/// ```
/// use core_types::number_to_string;
///
/// assert_eq!(number_to_string(42.0), "42");
/// assert_eq!(number_to_string(0.5), "0.5");
/// assert_eq!(number_to_string(1e21), "1e+21");
/// assert_eq!(number_to_string(f64::NAN), "NaN");
/// ```
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        return format!("{:.0}", n);
    }
    let mut buffer = ryu::Buffer::new();
    let text = buffer.format_finite(n);
    match text.find('e') {
        Some(pos) if !text[pos + 1..].starts_with('-') => {
            format!("{}e+{}", &text[..pos], &text[pos + 1..])
        }
        _ => text.to_string(),
    }
}

/// Parses a string into a number following the guest's `Number(...)` rules.
///
/// Surrounding whitespace is ignored, the empty string is `0`, `0x` prefixes
/// are hexadecimal and anything unparsable is `NaN`.
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |v| v as f64);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !numeric {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

impl fmt::Display for Value {
    /// String conversion for primitives; heap objects print as
    /// `[object Object]` since their contents live in the heap.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Smi(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", number_to_string(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::HeapObject(_) => write!(f, "[object Object]"),
        }
    }
}
