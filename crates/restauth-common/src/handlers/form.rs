//! [`FormHandler`] — `application/x-www-form-urlencoded` strategy.
//!
//! The form wire format is flat: dictionary values must be text, and lists
//! are encoded as dictionaries with synthetic `key0`, `key1`, … keys.
//! Booleans use the two-symbol `"1"`/`"0"` enumeration since the format
//! has no native boolean. Text goes over the wire as its raw UTF-8 bytes.

use url::form_urlencoded;

use crate::error::{MarshalError, UnmarshalError};
use crate::handler::ContentHandler;
use crate::value::{Dict, Value};

/// MIME type this handler registers under.
pub const MIME_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Default, Clone, Copy)]
pub struct FormHandler;

impl FormHandler {
    pub fn new() -> Self {
        Self
    }

    fn body_as_utf8<'a>(&self, data: &'a [u8]) -> Result<&'a str, UnmarshalError> {
        std::str::from_utf8(data)
            .map_err(|err| UnmarshalError::with_source("body is not valid UTF-8", err))
    }
}

impl ContentHandler for FormHandler {
    fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    fn supports_nested_dicts(&self) -> bool {
        false
    }

    fn marshal_str(&self, value: &str) -> Result<Vec<u8>, MarshalError> {
        Ok(value.as_bytes().to_vec())
    }

    fn marshal_bool(&self, value: bool) -> Result<Vec<u8>, MarshalError> {
        Ok(if value { b"1".to_vec() } else { b"0".to_vec() })
    }

    fn marshal_list(&self, value: &[String]) -> Result<Vec<u8>, MarshalError> {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (index, item) in value.iter().enumerate() {
            serializer.append_pair(&format!("key{index}"), item);
        }
        Ok(serializer.finish().into_bytes())
    }

    fn marshal_dict(&self, value: &Dict) -> Result<Vec<u8>, MarshalError> {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, entry) in value {
            match entry {
                Value::Str(s) => {
                    serializer.append_pair(key, s);
                }
                Value::Bool(_) | Value::List(_) | Value::Dict(_) => {
                    return Err(MarshalError::new(format!(
                        "form encoding supports only string dict values, got {}",
                        entry.kind()
                    )));
                }
            }
        }
        Ok(serializer.finish().into_bytes())
    }

    fn unmarshal_str(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        Ok(Value::Str(self.body_as_utf8(data)?.to_owned()))
    }

    fn unmarshal_bool(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        match data {
            b"1" => Ok(Value::Bool(true)),
            b"0" => Ok(Value::Bool(false)),
            other => Err(UnmarshalError::new(format!(
                "'{}' is not a marshalled boolean",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn unmarshal_list(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        let body = self.body_as_utf8(data)?;
        let mut entries: Vec<(usize, String)> = Vec::new();
        for (key, value) in form_urlencoded::parse(body.as_bytes()) {
            let index = key
                .strip_prefix("key")
                .and_then(|digits| digits.parse::<usize>().ok())
                .ok_or_else(|| {
                    UnmarshalError::new(format!("'{key}' is not a marshalled list index"))
                })?;
            entries.push((index, value.into_owned()));
        }
        entries.sort_by_key(|(index, _)| *index);
        for (position, (index, _)) in entries.iter().enumerate() {
            if *index != position {
                return Err(UnmarshalError::new(
                    "list body has missing or duplicate indexes",
                ));
            }
        }
        Ok(Value::List(
            entries.into_iter().map(|(_, item)| item).collect(),
        ))
    }

    fn unmarshal_dict(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        let body = self.body_as_utf8(data)?;
        let mut dict = Dict::new();
        for (key, value) in form_urlencoded::parse(body.as_bytes()) {
            // repeated keys: last value wins
            dict.insert(key.into_owned(), Value::Str(value.into_owned()));
        }
        Ok(Value::Dict(dict))
    }
}
