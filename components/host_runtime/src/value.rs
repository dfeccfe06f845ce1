//! Host values.

use crate::cell::{HostData, HostRef};
use std::fmt;

/// A host value: an immediate scalar or a counted reference to a cell.
///
/// Strings come in two flavours. [`HostValue::Str`] holds character data;
/// [`HostValue::Bytes`] holds octets that are interpreted as Latin-1 when a
/// character string is needed.
#[derive(Debug, Clone, Default)]
pub enum HostValue {
    /// The undefined value
    #[default]
    Undef,
    /// Integer scalar
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// Character string
    Str(String),
    /// Byte string
    Bytes(Vec<u8>),
    /// Reference to a cell
    Ref(HostRef),
}

impl HostValue {
    /// Whether the value is undefined.
    pub fn is_undef(&self) -> bool {
        matches!(self, HostValue::Undef)
    }

    /// The referenced cell, if this is a reference.
    pub fn as_ref(&self) -> Option<&HostRef> {
        match self {
            HostValue::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Truthiness: undef, `0`, `0.0`, `""` and `"0"` are false.
    pub fn is_true(&self) -> bool {
        match self {
            HostValue::Undef => false,
            HostValue::Int(n) => *n != 0,
            HostValue::Float(f) => *f != 0.0,
            HostValue::Str(s) => !(s.is_empty() || s == "0"),
            HostValue::Bytes(b) => !(b.is_empty() || b == b"0"),
            HostValue::Ref(_) => true,
        }
    }

    /// Numeric value; strings are parsed leniently, references yield their
    /// address.
    pub fn as_number(&self) -> f64 {
        match self {
            HostValue::Undef => 0.0,
            HostValue::Int(n) => *n as f64,
            HostValue::Float(f) => *f,
            HostValue::Str(s) => leading_number(s),
            HostValue::Bytes(b) => leading_number(&latin1_to_string(b)),
            HostValue::Ref(r) => r.address() as f64,
        }
    }

    /// String form, as interpolation would produce it.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undef => Ok(()),
            HostValue::Int(n) => write!(f, "{}", n),
            HostValue::Float(x) => write!(f, "{}", format_float(*x)),
            HostValue::Str(s) => f.write_str(s),
            HostValue::Bytes(b) => f.write_str(&latin1_to_string(b)),
            HostValue::Ref(r) => {
                let kind = match &*r.data() {
                    HostData::Scalar(_) => "SCALAR",
                    HostData::Array(_) => "ARRAY",
                    HostData::Hash(_) => "HASH",
                    HostData::Code(_) => "CODE",
                };
                match r.blessed() {
                    Some(class) => write!(f, "{}={}(0x{:x})", class, kind, r.address()),
                    None => write!(f, "{}(0x{:x})", kind, r.address()),
                }
            }
        }
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Int(n)
    }
}

impl From<i32> for HostValue {
    fn from(n: i32) -> Self {
        HostValue::Int(n.into())
    }
}

impl From<f64> for HostValue {
    fn from(f: f64) -> Self {
        HostValue::Float(f)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(s)
    }
}

impl From<HostRef> for HostValue {
    fn from(r: HostRef) -> Self {
        HostValue::Ref(r)
    }
}

/// Decodes Latin-1 octets.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn format_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Inf" } else { "-Inf" }.to_string()
    } else {
        format!("{}", x)
    }
}

fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .take_while(|&(i, c)| {
            c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || ((c == '-' || c == '+') && i == 0)
        })
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    (1..=end)
        .rev()
        .find_map(|n| s[..n].parse::<f64>().ok())
        .unwrap_or(0.0)
}
