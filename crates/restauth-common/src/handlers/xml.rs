//! [`XmlHandler`] — `application/xml` strategy.
//!
//! Wire format (canonical form, UTF-8, no XML declaration):
//! - Text:    `<str>escaped</str>`
//! - Boolean: `<bool>1</bool>` / `<bool>0</bool>`
//! - List:    `<list><str>a</str><str>b</str></list>`
//! - Dict:    `<dict><entry><key>k</key><str>v</str></entry>…</dict>`
//!
//! `&`, `<` and `>` are escaped as entities in text content; booleans use
//! the two-symbol `"1"`/`"0"` enumeration since XML has no native boolean.
//! The decoder is a strict cursor parser over this canonical form;
//! whitespace between tags is tolerated, anything else is an error.

use crate::error::{MarshalError, UnmarshalError};
use crate::handler::ContentHandler;
use crate::value::{Dict, Value};

/// MIME type this handler registers under.
pub const MIME_TYPE: &str = "application/xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct XmlHandler;

impl XmlHandler {
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        let body = std::str::from_utf8(data)
            .map_err(|err| UnmarshalError::with_source("body is not valid UTF-8", err))?;
        let mut cur = Cur { data: body, pos: 0 };
        cur.skip_ws();
        let value = read_value(&mut cur)?;
        cur.skip_ws();
        if !cur.at_end() {
            return Err(UnmarshalError::new("trailing data after document element"));
        }
        Ok(value)
    }
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            ch => out.push(ch),
        }
    }
}

fn unescape(raw: &str) -> Result<String, UnmarshalError> {
    if !raw.contains('&') {
        return Ok(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        if let Some(tail) = rest.strip_prefix("&amp;") {
            out.push('&');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&lt;") {
            out.push('<');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&gt;") {
            out.push('>');
            rest = tail;
        } else {
            return Err(UnmarshalError::new("unknown entity in body"));
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn write_str_element(out: &mut String, text: &str) {
    out.push_str("<str>");
    escape_into(out, text);
    out.push_str("</str>");
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Str(s) => write_str_element(out, s),
        Value::Bool(b) => {
            out.push_str("<bool>");
            out.push_str(if *b { "1" } else { "0" });
            out.push_str("</bool>");
        }
        Value::List(items) => {
            out.push_str("<list>");
            for item in items {
                write_str_element(out, item);
            }
            out.push_str("</list>");
        }
        Value::Dict(dict) => {
            out.push_str("<dict>");
            for (key, entry) in dict {
                out.push_str("<entry><key>");
                escape_into(out, key);
                out.push_str("</key>");
                write_value(out, entry);
                out.push_str("</entry>");
            }
            out.push_str("</dict>");
        }
    }
}

/// Internal cursor used during decoding. Positions are byte offsets; all
/// delimiters are ASCII, so slicing at them is always on a char boundary.
struct Cur<'a> {
    data: &'a str,
    pos: usize,
}

impl<'a> Cur<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn skip_ws(&mut self) {
        let bytes = self.data.as_bytes();
        while self.pos < bytes.len() && matches!(bytes[self.pos], b' ' | b'\t' | b'\r' | b'\n') {
            self.pos += 1;
        }
    }

    fn starts_with(&self, token: &str) -> bool {
        self.data[self.pos..].starts_with(token)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), UnmarshalError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(UnmarshalError::new(format!(
                "expected '{token}' at byte {}",
                self.pos
            )))
        }
    }

    /// Raw text content up to the next tag open.
    fn text_until_tag(&mut self) -> Result<&'a str, UnmarshalError> {
        let rest = &self.data[self.pos..];
        let end = rest
            .find('<')
            .ok_or_else(|| UnmarshalError::new("unterminated element"))?;
        self.pos += end;
        Ok(&rest[..end])
    }
}

fn read_text_element(cur: &mut Cur, open: &str, close: &str) -> Result<String, UnmarshalError> {
    cur.expect(open)?;
    let raw = cur.text_until_tag()?;
    cur.expect(close)?;
    unescape(raw)
}

fn read_value(cur: &mut Cur) -> Result<Value, UnmarshalError> {
    if cur.starts_with("<str>") {
        Ok(Value::Str(read_text_element(cur, "<str>", "</str>")?))
    } else if cur.starts_with("<bool>") {
        cur.expect("<bool>")?;
        let raw = cur.text_until_tag()?;
        cur.expect("</bool>")?;
        match raw {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(UnmarshalError::new(format!(
                "'{other}' is not a marshalled boolean"
            ))),
        }
    } else if cur.starts_with("<list>") {
        cur.expect("<list>")?;
        let mut items = Vec::new();
        loop {
            cur.skip_ws();
            if cur.eat("</list>") {
                break;
            }
            items.push(read_text_element(cur, "<str>", "</str>")?);
        }
        Ok(Value::List(items))
    } else if cur.starts_with("<dict>") {
        cur.expect("<dict>")?;
        let mut dict = Dict::new();
        loop {
            cur.skip_ws();
            if cur.eat("</dict>") {
                break;
            }
            cur.expect("<entry>")?;
            cur.skip_ws();
            let key = read_text_element(cur, "<key>", "</key>")?;
            cur.skip_ws();
            let value = read_value(cur)?;
            cur.skip_ws();
            cur.expect("</entry>")?;
            dict.insert(key, value);
        }
        Ok(Value::Dict(dict))
    } else {
        Err(UnmarshalError::new(format!(
            "unrecognized element at byte {}",
            cur.pos
        )))
    }
}

impl ContentHandler for XmlHandler {
    fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    fn marshal_str(&self, value: &str) -> Result<Vec<u8>, MarshalError> {
        let mut out = String::new();
        write_str_element(&mut out, value);
        Ok(out.into_bytes())
    }

    fn marshal_bool(&self, value: bool) -> Result<Vec<u8>, MarshalError> {
        Ok(if value {
            b"<bool>1</bool>".to_vec()
        } else {
            b"<bool>0</bool>".to_vec()
        })
    }

    fn marshal_list(&self, value: &[String]) -> Result<Vec<u8>, MarshalError> {
        let mut out = String::new();
        write_value(&mut out, &Value::List(value.to_vec()));
        Ok(out.into_bytes())
    }

    fn marshal_dict(&self, value: &Dict) -> Result<Vec<u8>, MarshalError> {
        let mut out = String::new();
        out.push_str("<dict>");
        for (key, entry) in value {
            out.push_str("<entry><key>");
            escape_into(&mut out, key);
            out.push_str("</key>");
            write_value(&mut out, entry);
            out.push_str("</entry>");
        }
        out.push_str("</dict>");
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
    fn canonical_bytes_for_a_nested_dict() {
        let handler = XmlHandler::new();
        let dict = Dict::from([
            ("a".to_owned(), Value::Str("1".into())),
            (
                "b".to_owned(),
                Value::Dict(Dict::from([("foo".to_owned(), Value::Str("bar".into()))])),
            ),
        ]);
        let bytes = handler.marshal_dict(&dict).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            "<dict><entry><key>a</key><str>1</str></entry>\
             <entry><key>b</key><dict><entry><key>foo</key><str>bar</str></entry></dict></entry></dict>"
        );
        assert_eq!(handler.unmarshal_dict(&bytes).unwrap(), Value::Dict(dict));
    }

    #[test]
    fn entities_are_escaped_and_restored() {
        let handler = XmlHandler::new();
        let text = "a & b <c> &amp;";
        let bytes = handler.marshal_str(text).unwrap();
        assert_eq!(
            bytes,
            b"<str>a &amp; b &lt;c&gt; &amp;amp;</str>".to_vec()
        );
        assert_eq!(handler.unmarshal_str(&bytes).unwrap(), Value::Str(text.into()));
    }

    #[test]
    fn whitespace_between_tags_is_tolerated() {
        let handler = XmlHandler::new();
        let body = b"<list>\n  <str>a</str>\n  <str></str>\n</list>\n";
        assert_eq!(
            handler.unmarshal_list(body).unwrap(),
            Value::List(vec!["a".into(), String::new()])
        );
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        let handler = XmlHandler::new();
        handler.unmarshal_str(b"<str>unterminated").unwrap_err();
        handler.unmarshal_str(b"<junk>x</junk>").unwrap_err();
        handler.unmarshal_bool(b"<bool>maybe</bool>").unwrap_err();
        handler.unmarshal_dict(b"<dict><entry><key>k</key></entry></dict>").unwrap_err();
        handler.unmarshal_str(b"<str>x</str><str>y</str>").unwrap_err();
        handler.unmarshal_str(b"<str>bad &entity;</str>").unwrap_err();
    }

    #[test]
    fn empty_containers_roundtrip() {
        let handler = XmlHandler::new();
        assert_eq!(handler.marshal_list(&[]).unwrap(), b"<list></list>");
        assert_eq!(handler.marshal_dict(&Dict::new()).unwrap(), b"<dict></dict>");
        assert_eq!(
            handler.unmarshal_list(b"<list></list>").unwrap(),
            Value::List(Vec::new())
        );
        assert_eq!(
            handler.unmarshal_dict(b"<dict></dict>").unwrap(),
            Value::Dict(Dict::new())
        );
    }
}
