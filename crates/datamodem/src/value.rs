//! The dynamic value tree the decoders populate.
//!
//! This module defines the [`Value`] enum, a tagged union over every node
//! kind both wire formats can produce, plus helpers for rendering a tree
//! back out as JSON text.

use alloc::{collections::BTreeMap, string::String, vec::Vec};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bstr::BStr;

/// An ordered map of string keys to values. Keys are unique; inserting an
/// existing key replaces its value (last write wins).
pub type Dict = BTreeMap<String, Value>;
/// An ordered sequence of values.
pub type Array = Vec<Value>;

/// A node in the decoded value tree.
///
/// The two decoders produce the same tree shape from their respective
/// formats: JSON numbers land in [`Integer`] when they are whole and fit
/// an `i64`, otherwise in [`Double`]; CBOR byte strings land in
/// [`Bytes`], which JSON cannot express directly.
///
/// # Examples
///
/// ```
/// use datamodem::{Dict, Value};
///
/// let mut map = Dict::new();
/// map.insert("key".to_string(), Value::String("value".into()));
/// let v = Value::Dict(map);
/// assert_eq!(v.to_string(), r#"{"key":"value"}"#);
/// ```
///
/// [`Integer`]: Value::Integer
/// [`Double`]: Value::Double
/// [`Bytes`]: Value::Bytes
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Array),
    Dict(Dict),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Dict> for Value {
    fn from(v: Dict) -> Self {
        Self::Dict(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is [`Bool`].
    ///
    /// [`Bool`]: Value::Bool
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(..))
    }

    /// Returns `true` if the value is [`Integer`].
    ///
    /// [`Integer`]: Value::Integer
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(..))
    }

    /// Returns `true` if the value is [`Double`].
    ///
    /// [`Double`]: Value::Double
    #[must_use]
    pub fn is_double(&self) -> bool {
        matches!(self, Self::Double(..))
    }

    /// Returns `true` if the value is [`String`].
    ///
    /// [`String`]: Value::String
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    /// Returns `true` if the value is [`Bytes`].
    ///
    /// [`Bytes`]: Value::Bytes
    #[must_use]
    pub fn is_bytes(&self) -> bool {
        matches!(self, Self::Bytes(..))
    }

    /// Returns `true` if the value is [`Array`].
    ///
    /// [`Array`]: Value::Array
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `true` if the value is [`Dict`].
    ///
    /// [`Dict`]: Value::Dict
    #[must_use]
    pub fn is_dict(&self) -> bool {
        matches!(self, Self::Dict(..))
    }
}

impl core::fmt::Debug for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            Value::Double(d) => f.debug_tuple("Double").field(d).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Bytes(b) => f.debug_tuple("Bytes").field(&BStr::new(b)).finish(),
            Value::Array(arr) => f.debug_tuple("Array").field(arr).finish(),
            Value::Dict(map) => f.debug_tuple("Dict").field(map).finish(),
        }
    }
}

/// Escapes control characters in a string for inclusion in a JSON string
/// literal.
pub(crate) fn write_escaped_string<W: core::fmt::Write>(src: &str, f: &mut W) -> core::fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            c if c.is_ascii_control() => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

impl core::fmt::Display for Value {
    /// Renders the tree as JSON text, using the same two non-standard bare
    /// tokens (`nan`, `inf`) the text decoder accepts. Byte strings are
    /// rendered as base64 string literals.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Double(d) => {
                if d.is_nan() {
                    f.write_str("nan")
                } else if d.is_infinite() {
                    f.write_str(if *d < 0.0 { "-inf" } else { "inf" })
                } else {
                    write!(f, "{d}")
                }
            }
            Value::String(s) => {
                f.write_str("\"")?;
                write_escaped_string(s, f)?;
                f.write_str("\"")
            }
            Value::Bytes(b) => {
                write!(f, "\"{}\"", BASE64.encode(b))
            }
            Value::Array(arr) => {
                f.write_str("[")?;
                let mut first = true;
                for v in arr {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Dict(map) => {
                f.write_str("{")?;
                let mut first = true;
                for (k, v) in map {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    f.write_str("\"")?;
                    write_escaped_string(k, f)?;
                    write!(f, "\":{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}
