use std::collections::BTreeMap;

use bytes::Bytes;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;

/// A decoded RPC argument or result.
///
/// Mappings are keyed by string; key order carries no meaning on the wire,
/// so a `BTreeMap` keeps output deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Object {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Bytes),
    List(Vec<Object>),
    Map(BTreeMap<String, Object>),
}

impl Object {
    /// An empty mapping.
    pub fn empty_map() -> Self {
        Object::Map(BTreeMap::new())
    }

    /// An empty list.
    pub fn empty_list() -> Self {
        Object::List(Vec::new())
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Bool(_) => "bool",
            Object::Int(_) => "int",
            Object::UInt(_) => "uint",
            Object::Float(_) => "float",
            Object::String(_) => "string",
            Object::Bytes(_) => "bytes",
            Object::List(_) => "list",
            Object::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    /// Signed view of an integer object. Unsigned values above `i64::MAX` yield `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Object::Int(v) => Some(*v),
            Object::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Unsigned view of an integer object. Negative values yield `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Object::UInt(v) => Some(*v),
            Object::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Object]> {
        match self {
            Object::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Object>> {
        match self {
            Object::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` when this object is a mapping.
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Convert into a JSON value.
    ///
    /// Bytes become an array of byte values and non-finite floats become
    /// `null`, since JSON has no representation for either.
    pub fn to_json(&self) -> Value {
        match self {
            Object::Null => Value::Null,
            Object::Bool(b) => Value::Bool(*b),
            Object::Int(v) => Value::from(*v),
            Object::UInt(v) => Value::from(*v),
            Object::Float(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Object::String(s) => Value::String(s.clone()),
            Object::Bytes(b) => Value::Array(b.iter().map(|byte| Value::from(*byte)).collect()),
            Object::List(items) => Value::Array(items.iter().map(Object::to_json).collect()),
            Object::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Object {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Object::Null,
            Value::Bool(b) => Object::Bool(b),
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Object::UInt(v)
                } else if let Some(v) = n.as_i64() {
                    Object::Int(v)
                } else {
                    Object::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Object::String(s),
            Value::Array(items) => Object::List(items.into_iter().map(Object::from).collect()),
            Value::Object(map) => Object::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Object::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Object> for Value {
    fn from(object: &Object) -> Self {
        object.to_json()
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Bool(value)
    }
}

impl From<i32> for Object {
    fn from(value: i32) -> Self {
        Object::Int(i64::from(value))
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Int(value)
    }
}

impl From<u64> for Object {
    fn from(value: u64) -> Self {
        Object::UInt(value)
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::Float(value)
    }
}

impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Object::String(value.to_string())
    }
}

impl From<String> for Object {
    fn from(value: String) -> Self {
        Object::String(value)
    }
}

impl From<Bytes> for Object {
    fn from(value: Bytes) -> Self {
        Object::Bytes(value)
    }
}

impl From<Vec<Object>> for Object {
    fn from(value: Vec<Object>) -> Self {
        Object::List(value)
    }
}

impl From<Vec<String>> for Object {
    fn from(value: Vec<String>) -> Self {
        Object::List(value.into_iter().map(Object::String).collect())
    }
}

impl From<BTreeMap<String, Object>> for Object {
    fn from(value: BTreeMap<String, Object>) -> Self {
        Object::Map(value)
    }
}

impl<K: Into<String>, V: Into<Object>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Object::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Object::Null => serializer.serialize_unit(),
            Object::Bool(b) => serializer.serialize_bool(*b),
            Object::Int(v) => serializer.serialize_i64(*v),
            Object::UInt(v) => serializer.serialize_u64(*v),
            Object::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Object::Float(_) => serializer.serialize_unit(),
            Object::String(s) => serializer.serialize_str(s),
            Object::Bytes(b) => {
                let mut seq = serializer.serialize_seq(Some(b.len()))?;
                for byte in b.iter() {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            Object::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Object::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}
