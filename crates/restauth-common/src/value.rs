//! [`Value`] — the wire value model shared by all content handlers.
//!
//! The RestAuth protocol exchanges exactly four shapes of data: strings,
//! booleans, lists of strings, and dictionaries with string keys. Every
//! handler marshals and unmarshals this closed set and nothing else.

use std::collections::BTreeMap;
use std::fmt;

/// Dictionary body: string keys mapped to nested wire values.
///
/// Key order is irrelevant to the protocol; `BTreeMap` makes every
/// encoder's dictionary output canonical.
pub type Dict = BTreeMap<String, Value>;

/// A value that can cross the wire in any registered content type.
///
/// Round-tripping a `Value` through `marshal`/`unmarshal` reproduces it by
/// structural equality (`PartialEq`), never by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text.
    Str(String),
    /// Boolean.
    Bool(bool),
    /// Ordered list of strings; element order and repeats are preserved.
    List(Vec<String>),
    /// Dictionary; values may be any wire value, including nested
    /// dictionaries, though individual strategies may refuse to encode the
    /// nested forms.
    Dict(Dict),
}

/// The tag identifying which of the four shapes a [`Value`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Str,
    Bool,
    List,
    Dict,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Str => "str",
            Kind::Bool => "bool",
            Kind::List => "list",
            Kind::Dict => "dict",
        };
        f.write_str(name)
    }
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Str(_) => Kind::Str,
            Value::Bool(_) => Kind::Bool,
            Value::List(_) => Kind::List,
            Value::Dict(_) => Kind::Dict,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Convert a JSON tree into a wire value.
    ///
    /// Returns `None` for anything outside the wire value model: nulls,
    /// numbers, arrays with non-string elements, or objects whose values
    /// are themselves unrepresentable.
    pub fn from_json(value: serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::Bool(b) => Some(Value::Bool(b)),
            serde_json::Value::String(s) => Some(Value::Str(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect::<Option<Vec<String>>>()
                .map(Value::List),
            serde_json::Value::Object(entries) => entries
                .into_iter()
                .map(|(key, value)| Value::from_json(value).map(|value| (key, value)))
                .collect::<Option<Dict>>()
                .map(Value::Dict),
            serde_json::Value::Null | serde_json::Value::Number(_) => None,
        }
    }

    /// Convert this value into a JSON tree. Total: every wire value has a
    /// JSON representation.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .cloned()
                    .map(serde_json::Value::String)
                    .collect(),
            ),
            Value::Dict(dict) => serde_json::Value::Object(
                dict.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Value::Dict(dict)
    }
}
