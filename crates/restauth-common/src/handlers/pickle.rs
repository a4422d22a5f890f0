//! [`PickleHandler`] — `application/pickle` strategy.
//!
//! Wraps the `serde_pickle` codec (protocol 3). Wire values map through
//! [`serde_pickle::value::Value`]; dictionary keys are
//! `HashableValue::String`. Anything the pickle decoder produces outside
//! the wire value model — numbers, tuples, sets, raw byte strings — is an
//! [`UnmarshalError`].

use serde_pickle::value::{HashableValue, Value as PickleValue};
use serde_pickle::{DeOptions, SerOptions};

use crate::error::{MarshalError, UnmarshalError};
use crate::handler::ContentHandler;
use crate::value::{Dict, Value};

/// MIME type this handler registers under.
pub const MIME_TYPE: &str = "application/pickle";

#[derive(Debug, Default, Clone, Copy)]
pub struct PickleHandler;

impl PickleHandler {
    pub fn new() -> Self {
        Self
    }

    fn encode(&self, value: &PickleValue) -> Result<Vec<u8>, MarshalError> {
        serde_pickle::value_to_vec(value, SerOptions::new())
            .map_err(|err| MarshalError::with_source("could not encode value as pickle", err))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        let parsed = serde_pickle::value_from_slice(data, DeOptions::new())
            .map_err(|err| UnmarshalError::with_source("could not parse body as pickle", err))?;
        from_pickle(parsed)
            .ok_or_else(|| UnmarshalError::new("body contains values outside the wire value model"))
    }
}

fn to_pickle(value: &Value) -> PickleValue {
    match value {
        Value::Str(s) => PickleValue::String(s.clone()),
        Value::Bool(b) => PickleValue::Bool(*b),
        Value::List(items) => {
            PickleValue::List(items.iter().cloned().map(PickleValue::String).collect())
        }
        Value::Dict(dict) => PickleValue::Dict(
            dict.iter()
                .map(|(key, entry)| (HashableValue::String(key.clone()), to_pickle(entry)))
                .collect(),
        ),
    }
}

fn from_pickle(value: PickleValue) -> Option<Value> {
    match value {
        PickleValue::String(s) => Some(Value::Str(s)),
        PickleValue::Bool(b) => Some(Value::Bool(b)),
        PickleValue::List(items) => items
            .into_iter()
            .map(|item| match item {
                PickleValue::String(s) => Some(s),
                _ => None,
            })
            .collect::<Option<Vec<String>>>()
            .map(Value::List),
        PickleValue::Dict(entries) => entries
            .into_iter()
            .map(|(key, entry)| match key {
                HashableValue::String(key) => from_pickle(entry).map(|entry| (key, entry)),
                _ => None,
            })
            .collect::<Option<Dict>>()
            .map(Value::Dict),
        _ => None,
    }
}

impl ContentHandler for PickleHandler {
    fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    fn marshal_str(&self, value: &str) -> Result<Vec<u8>, MarshalError> {
        self.encode(&PickleValue::String(value.to_owned()))
    }

    fn marshal_bool(&self, value: bool) -> Result<Vec<u8>, MarshalError> {
        self.encode(&PickleValue::Bool(value))
    }

    fn marshal_list(&self, value: &[String]) -> Result<Vec<u8>, MarshalError> {
        self.encode(&PickleValue::List(
            value.iter().cloned().map(PickleValue::String).collect(),
        ))
    }

    fn marshal_dict(&self, value: &Dict) -> Result<Vec<u8>, MarshalError> {
        self.encode(&to_pickle(&Value::Dict(value.clone())))
    }

    fn unmarshal_str(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.decode(data)
    }

    fn unmarshal_bool(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.decode(data)
    }

    fn unmarshal_list(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.decode(data)
    }

    fn unmarshal_dict(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.decode(data)
    }
}
