#![forbid(unsafe_code)]

//! Dynamic state values.
//!
//! [`Value`] is the data model a component's state is built from. Objects are
//! the only composite kind: they are the nodes the reactive state tree
//! instruments. Lists are carried as opaque leaves.
//!
//! The [`Display`](std::fmt::Display) impl is the text a placeholder renders
//! to, so its formatting is part of the observable contract:
//!
//! | value | rendered |
//! |-------|----------|
//! | `Null` | `null` |
//! | `Bool(true)` | `true` |
//! | `Int(42)` | `42` |
//! | `Float(2.0)` / `Float(1.5)` | `2` / `1.5` |
//! | `Float(1e21)` / `Float(1e-7)` | `1e+21` / `1e-7` |
//! | `Str("hi")` | `hi` |
//! | `List([1, 2])` | `1,2` |
//! | `Object(..)` | `[object Object]` |

use std::fmt;

use indexmap::IndexMap;

/// Ordered key/value mapping used for object values.
pub type Map = IndexMap<String, Value>;

/// A dynamically typed state value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Opaque sequence. Elements are not instrumented.
    List(Vec<Value>),
    /// Composite value; every property becomes an observable slot.
    Object(Map),
}

impl Value {
    /// Build an object from `(key, value)` pairs, preserving order.
    #[must_use]
    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Whether this value is a composite that gets instrumented.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Property lookup on an object value. `None` for non-objects.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) if x.is_nan() => f.write_str("NaN"),
            Self::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Self::Float(x) => write_number(*x, f),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Object(_) => f.write_str("[object Object]"),
        }
    }
}

/// Finite float text: plain decimal for magnitudes in `[1e-6, 1e21)`,
/// shortest exponent form (`1e+21`, `1.5e-7`) outside it, and `0` for
/// either zero.
fn write_number(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x == 0.0 {
        return f.write_str("0");
    }
    if (1e-6..1e21).contains(&x.abs()) {
        return write!(f, "{x}");
    }
    let exponent_form = format!("{x:e}");
    match exponent_form.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{mantissa}e+{exp}"),
        _ => f.write_str(&exponent_form),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Object(map)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

#[cfg(feature = "serde")]
mod json {
    use super::{Map, Value};

    impl From<serde_json::Value> for Value {
        fn from(json: serde_json::Value) -> Self {
            match json {
                serde_json::Value::Null => Self::Null,
                serde_json::Value::Bool(b) => Self::Bool(b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => Self::Int(i),
                    None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
                serde_json::Value::String(s) => Self::Str(s),
                serde_json::Value::Array(items) => {
                    Self::List(items.into_iter().map(Value::from).collect())
                }
                serde_json::Value::Object(map) => Self::Object(
                    map.into_iter()
                        .map(|(k, v)| (k, Value::from(v)))
                        .collect::<Map>(),
                ),
            }
        }
    }

    impl From<Value> for serde_json::Value {
        fn from(value: Value) -> Self {
            match value {
                Value::Null => Self::Null,
                Value::Bool(b) => Self::Bool(b),
                Value::Int(n) => Self::from(n),
                Value::Float(x) => serde_json::Number::from_f64(x).map_or(Self::Null, Self::Number),
                Value::Str(s) => Self::String(s),
                Value::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
                Value::Object(map) => Self::Object(
                    map.into_iter()
                        .map(|(k, v)| (k, Self::from(v)))
                        .collect(),
                ),
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Value {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            serde_json::Value::deserialize(deserializer).map(Value::from)
        }
    }

    impl serde::Serialize for Value {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serde_json::Value::from(self.clone()).serialize(serializer)
        }
    }
}
