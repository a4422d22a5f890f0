//! [`YamlHandler`] — `application/yaml` strategy.
//!
//! Emission is hand-rolled block-style YAML with every scalar
//! double-quoted, so text like `"1"` or `"true"` survives the round trip
//! as text. Empty containers emit flow-style `[]`/`{}`. Parsing goes
//! through `serde_saphyr` into a JSON tree and from there into the wire
//! value model, so the decoders are loose and the generic `unmarshal`
//! post-condition does the narrowing.

use crate::error::{MarshalError, UnmarshalError};
use crate::handler::ContentHandler;
use crate::value::{Dict, Value};

/// MIME type this handler registers under.
pub const MIME_TYPE: &str = "application/yaml";

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlHandler;

impl YamlHandler {
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        let body = std::str::from_utf8(data)
            .map_err(|err| UnmarshalError::with_source("body is not valid UTF-8", err))?;
        let parsed: serde_json::Value = serde_saphyr::from_str(body)
            .map_err(|err| UnmarshalError::with_source("could not parse body as YAML", err))?;
        Value::from_json(parsed)
            .ok_or_else(|| UnmarshalError::new("body contains values outside the wire value model"))
    }
}

/// Append `scalar` double-quoted, escaping the characters YAML folds or
/// forbids inside double quotes (line breaks, tabs, the Unicode break
/// characters, other controls).
fn write_scalar(out: &mut String, scalar: &str) {
    out.push('"');
    for ch in scalar.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{85}' | '\u{2028}' | '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", ch as u32));
            }
            ch if (ch as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}

fn write_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push(' ');
    }
}

fn write_list(out: &mut String, items: &[String], indent: usize) {
    for item in items {
        write_indent(out, indent);
        out.push_str("- ");
        write_scalar(out, item);
        out.push('\n');
    }
}

fn write_dict(out: &mut String, dict: &Dict, indent: usize) {
    for (key, value) in dict {
        write_indent(out, indent);
        write_scalar(out, key);
        out.push(':');
        match value {
            Value::Str(s) => {
                out.push(' ');
                write_scalar(out, s);
                out.push('\n');
            }
            Value::Bool(b) => {
                out.push_str(if *b { " true\n" } else { " false\n" });
            }
            Value::List(items) if items.is_empty() => out.push_str(" []\n"),
            Value::List(items) => {
                out.push('\n');
                write_list(out, items, indent + 2);
            }
            Value::Dict(nested) if nested.is_empty() => out.push_str(" {}\n"),
            Value::Dict(nested) => {
                out.push('\n');
                write_dict(out, nested, indent + 2);
            }
        }
    }
}

impl ContentHandler for YamlHandler {
    fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    fn marshal_str(&self, value: &str) -> Result<Vec<u8>, MarshalError> {
        let mut out = String::new();
        write_scalar(&mut out, value);
        out.push('\n');
        Ok(out.into_bytes())
    }

    fn marshal_bool(&self, value: bool) -> Result<Vec<u8>, MarshalError> {
        Ok(if value {
            b"true\n".to_vec()
        } else {
            b"false\n".to_vec()
        })
    }

    fn marshal_list(&self, value: &[String]) -> Result<Vec<u8>, MarshalError> {
        if value.is_empty() {
            return Ok(b"[]\n".to_vec());
        }
        let mut out = String::new();
        write_list(&mut out, value, 0);
        Ok(out.into_bytes())
    }

    fn marshal_dict(&self, value: &Dict) -> Result<Vec<u8>, MarshalError> {
        if value.is_empty() {
            return Ok(b"{}\n".to_vec());
        }
        let mut out = String::new();
        write_dict(&mut out, value, 0);
        Ok(out.into_bytes())
    }

    fn unmarshal_str(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.parse(data)
    }

    fn unmarshal_bool(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.parse(data)
    }

    fn unmarshal_list(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.parse(data)
    }

    fn unmarshal_dict(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        self.parse(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_stay_quoted() {
        let handler = YamlHandler::new();
        assert_eq!(handler.marshal_str("foobar").unwrap(), b"\"foobar\"\n");
        // quoting keeps digit strings and boolean words textual
        assert_eq!(
            handler.unmarshal_str(b"\"1\"\n").unwrap(),
            Value::Str("1".into())
        );
        assert_eq!(
            handler.unmarshal_str(b"\"true\"\n").unwrap(),
            Value::Str("true".into())
        );
    }

    #[test]
    fn nested_dict_block_layout() {
        let handler = YamlHandler::new();
        let dict = Dict::from([
            ("a".to_owned(), Value::Str("1".into())),
            (
                "b".to_owned(),
                Value::Dict(Dict::from([("foo".to_owned(), Value::Str("bar".into()))])),
            ),
            ("c".to_owned(), Value::List(vec!["x".into()])),
            ("d".to_owned(), Value::Dict(Dict::new())),
        ]);
        let bytes = handler.marshal_dict(&dict).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            "\"a\": \"1\"\n\"b\":\n  \"foo\": \"bar\"\n\"c\":\n  - \"x\"\n\"d\": {}\n"
        );
        assert_eq!(handler.unmarshal_dict(&bytes).unwrap(), Value::Dict(dict));
    }

    #[test]
    fn empty_containers_are_flow_style() {
        let handler = YamlHandler::new();
        assert_eq!(handler.marshal_list(&[]).unwrap(), b"[]\n");
        assert_eq!(handler.marshal_dict(&Dict::new()).unwrap(), b"{}\n");
        assert_eq!(handler.unmarshal_list(b"[]\n").unwrap(), Value::List(Vec::new()));
        assert_eq!(handler.unmarshal_dict(b"{}\n").unwrap(), Value::Dict(Dict::new()));
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        let handler = YamlHandler::new();
        handler.unmarshal_str(b"\"unterminated").unwrap_err();
        handler.unmarshal_list(b"[unclosed").unwrap_err();
        handler.unmarshal_dict(b"\xff\xfe").unwrap_err();
    }

    #[test]
    fn escaped_characters_roundtrip() {
        let handler = YamlHandler::new();
        let text = "line\nbreak\ttab \"quote\" back\\slash";
        let bytes = handler.marshal_str(text).unwrap();
        assert_eq!(handler.unmarshal_str(&bytes).unwrap(), Value::Str(text.into()));
    }
}
