//! [`JsonHandler`] — the default/reference strategy (`application/json`).
//!
//! Strings are wrapped on the wire: a bare JSON string would be ambiguous
//! with the scalar encodings of other strategies, so `"foo"` marshals as
//! the one-element array `["foo"]` and `unmarshal_str` accepts nothing
//! else. Booleans, lists and dictionaries are the native JSON types, with
//! serde_json's compact separators so the encoding is deterministic.

use crate::error::{MarshalError, UnmarshalError};
use crate::handler::ContentHandler;
use crate::value::{Dict, Value};

/// MIME type this handler registers under.
pub const MIME_TYPE: &str = "application/json";

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonHandler;

impl JsonHandler {
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, data: &[u8]) -> Result<serde_json::Value, UnmarshalError> {
        serde_json::from_slice(data)
            .map_err(|err| UnmarshalError::with_source("could not parse body as JSON", err))
    }

    /// Loose decode: parse any JSON document and convert it to the nearest
    /// wire value. The generic `unmarshal` post-condition rejects the
    /// mismatched kinds.
    fn parse_value(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        let parsed = self.parse(data)?;
        Value::from_json(parsed)
            .ok_or_else(|| UnmarshalError::new("body contains values outside the wire value model"))
    }
}

impl ContentHandler for JsonHandler {
    fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    fn marshal_str(&self, value: &str) -> Result<Vec<u8>, MarshalError> {
        serde_json::to_vec(&[value])
            .map_err(|err| MarshalError::with_source("could not encode string as JSON", err))
    }

    fn marshal_bool(&self, value: bool) -> Result<Vec<u8>, MarshalError> {
        serde_json::to_vec(&value)
            .map_err(|err| MarshalError::with_source("could not encode boolean as JSON", err))
    }

    fn marshal_list(&self, value: &[String]) -> Result<Vec<u8>, MarshalError> {
        serde_json::to_vec(value)
            .map_err(|err| MarshalError::with_source("could not encode list as JSON", err))
    }

    fn marshal_dict(&self, value: &Dict) -> Result<Vec<u8>, MarshalError> {
        let tree: serde_json::Map<String, serde_json::Value> = value
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        serde_json::to_vec(&tree)
            .map_err(|err| MarshalError::with_source("could not encode dict as JSON", err))
    }

    fn unmarshal_str(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        let parsed = self.parse(data)?;
        match parsed {
            serde_json::Value::Array(mut items) if items.len() == 1 => match items.pop() {
                Some(serde_json::Value::String(s)) => Ok(Value::Str(s)),
                _ => Err(UnmarshalError::new("could not parse body as string")),
            },
            _ => Err(UnmarshalError::new("could not parse body as string")),
        }
    }

    fn unmarshal_bool(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.parse_value(data)
    }

    fn unmarshal_list(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.parse_value(data)
    }

    fn unmarshal_dict(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.parse_value(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;

    #[test]
    fn strings_are_wrapped_in_a_one_element_array() {
        let handler = JsonHandler::new();
        assert_eq!(handler.marshal_str("").unwrap(), b"[\"\"]");
        assert_eq!(handler.marshal_str("foobar").unwrap(), b"[\"foobar\"]");
        assert_eq!(
            handler.unmarshal_str(b"[\"foobar\"]").unwrap(),
            Value::Str("foobar".into())
        );
    }

    #[test]
    fn bare_scalars_are_not_strings() {
        let handler = JsonHandler::new();
        handler.unmarshal_str(b"\"rawstr\"").unwrap_err();
        handler.unmarshal_str(b"true").unwrap_err();
        handler.unmarshal_str(b"[]").unwrap_err();
        handler.unmarshal_str(b"[\"a\", \"b\"]").unwrap_err();
        handler.unmarshal_str(b"[true]").unwrap_err();
    }

    #[test]
    fn empty_body_is_malformed_for_every_kind() {
        let handler = JsonHandler::new();
        handler.unmarshal(b"", Kind::Str).unwrap_err();
        handler.unmarshal(b"", Kind::Bool).unwrap_err();
        handler.unmarshal(b"", Kind::List).unwrap_err();
        handler.unmarshal(b"", Kind::Dict).unwrap_err();
    }

    #[test]
    fn dict_encoding_is_compact_and_key_ordered() {
        let handler = JsonHandler::new();
        let dict = Dict::from([
            ("b".to_owned(), Value::Str("2".into())),
            ("a".to_owned(), Value::Str("1".into())),
        ]);
        assert_eq!(handler.marshal_dict(&dict).unwrap(), br#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn foreign_json_values_are_rejected() {
        let handler = JsonHandler::new();
        handler.unmarshal_dict(br#"{"a":1}"#).unwrap_err();
        handler.unmarshal_list(b"[1,2]").unwrap_err();
        handler.unmarshal_bool(b"null").unwrap_err();
    }
}
