//! [`MsgPackHandler`] — `application/messagepack` strategy.
//!
//! Hand-rolled MessagePack codec covering exactly the subset the wire
//! value model needs: str (fixstr/str8/str16/str32), bool, array
//! (fixarray/array16/array32) and map (fixmap/map16/map32). The decoder
//! rejects every other marker and any trailing bytes.

use crate::error::{MarshalError, UnmarshalError};
use crate::handler::ContentHandler;
use crate::value::{Dict, Value};

/// MIME type this handler registers under.
pub const MIME_TYPE: &str = "application/messagepack";

const FALSE: u8 = 0xc2;
const TRUE: u8 = 0xc3;
const STR8: u8 = 0xd9;
const STR16: u8 = 0xda;
const STR32: u8 = 0xdb;
const ARR16: u8 = 0xdc;
const ARR32: u8 = 0xdd;
const MAP16: u8 = 0xde;
const MAP32: u8 = 0xdf;

#[derive(Debug, Default, Clone, Copy)]
pub struct MsgPackHandler;

impl MsgPackHandler {
    pub fn new() -> Self {
        Self
    }

    fn decode(&self, data: &[u8]) -> Result<Value, UnmarshalError> {
        let mut cur = Cur { data, pos: 0 };
        let value = read_value(&mut cur)?;
        if cur.pos != data.len() {
            return Err(UnmarshalError::new("trailing bytes after value"));
        }
        Ok(value)
    }
}

fn write_str(out: &mut Vec<u8>, s: &str) -> Result<(), MarshalError> {
    let len = s.len();
    if len < 32 {
        out.push(0xa0 | len as u8);
    } else if len <= 0xff {
        out.push(STR8);
        out.push(len as u8);
    } else if len <= 0xffff {
        out.push(STR16);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= 0xffff_ffff {
        out.push(STR32);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        return Err(MarshalError::new("string exceeds the MessagePack length limit"));
    }
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_container_header(
    out: &mut Vec<u8>,
    len: usize,
    fix_base: u8,
    marker16: u8,
    marker32: u8,
) -> Result<(), MarshalError> {
    if len < 16 {
        out.push(fix_base | len as u8);
    } else if len <= 0xffff {
        out.push(marker16);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= 0xffff_ffff {
        out.push(marker32);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        return Err(MarshalError::new(
            "container exceeds the MessagePack length limit",
        ));
    }
    Ok(())
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> Result<(), MarshalError> {
    match value {
        Value::Str(s) => write_str(out, s),
        Value::Bool(b) => {
            out.push(if *b { TRUE } else { FALSE });
            Ok(())
        }
        Value::List(items) => {
            write_container_header(out, items.len(), 0x90, ARR16, ARR32)?;
            for item in items {
                write_str(out, item)?;
            }
            Ok(())
        }
        Value::Dict(dict) => {
            write_container_header(out, dict.len(), 0x80, MAP16, MAP32)?;
            for (key, entry) in dict {
                write_str(out, key)?;
                write_value(out, entry)?;
            }
            Ok(())
        }
    }
}

/// Internal cursor used during decoding; every read is bounds-checked so
/// truncated bodies surface as errors, not panics.
struct Cur<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cur<'a> {
    fn u8(&mut self) -> Result<u8, UnmarshalError> {
        let byte = self
            .data
            .get(self.pos)
            .copied()
            .ok_or_else(|| UnmarshalError::new("unexpected end of body"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], UnmarshalError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| UnmarshalError::new("unexpected end of body"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, UnmarshalError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32, UnmarshalError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

fn read_str_body(cur: &mut Cur, len: usize) -> Result<String, UnmarshalError> {
    let bytes = cur.take(len)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| UnmarshalError::with_source("invalid UTF-8 in string", err))
}

fn read_str(cur: &mut Cur) -> Result<String, UnmarshalError> {
    let marker = cur.u8()?;
    let len = match marker {
        m if m & 0xe0 == 0xa0 => (m & 0x1f) as usize,
        STR8 => cur.u8()? as usize,
        STR16 => cur.u16()? as usize,
        STR32 => cur.u32()? as usize,
        other => {
            return Err(UnmarshalError::new(format!(
                "expected string marker, got 0x{other:02x}"
            )))
        }
    };
    read_str_body(cur, len)
}

fn read_value(cur: &mut Cur) -> Result<Value, UnmarshalError> {
    let marker = cur.u8()?;
    match marker {
        TRUE => Ok(Value::Bool(true)),
        FALSE => Ok(Value::Bool(false)),
        m if m & 0xe0 == 0xa0 => read_str_body(cur, (m & 0x1f) as usize).map(Value::Str),
        STR8 => {
            let len = cur.u8()? as usize;
            read_str_body(cur, len).map(Value::Str)
        }
        STR16 => {
            let len = cur.u16()? as usize;
            read_str_body(cur, len).map(Value::Str)
        }
        STR32 => {
            let len = cur.u32()? as usize;
            read_str_body(cur, len).map(Value::Str)
        }
        m if m & 0xf0 == 0x90 => read_list(cur, (m & 0x0f) as usize),
        ARR16 => {
            let len = cur.u16()? as usize;
            read_list(cur, len)
        }
        ARR32 => {
            let len = cur.u32()? as usize;
            read_list(cur, len)
        }
        m if m & 0xf0 == 0x80 => read_map(cur, (m & 0x0f) as usize),
        MAP16 => {
            let len = cur.u16()? as usize;
            read_map(cur, len)
        }
        MAP32 => {
            let len = cur.u32()? as usize;
            read_map(cur, len)
        }
        other => Err(UnmarshalError::new(format!(
            "unsupported MessagePack marker 0x{other:02x}"
        ))),
    }
}

fn read_list(cur: &mut Cur, len: usize) -> Result<Value, UnmarshalError> {
    let mut items = Vec::with_capacity(len.min(64));
    for _ in 0..len {
        items.push(read_str(cur)?);
    }
    Ok(Value::List(items))
}

fn read_map(cur: &mut Cur, len: usize) -> Result<Value, UnmarshalError> {
    let mut dict = Dict::new();
    for _ in 0..len {
        let key = read_str(cur)?;
        let value = read_value(cur)?;
        dict.insert(key, value);
    }
    Ok(Value::Dict(dict))
}

impl ContentHandler for MsgPackHandler {
    fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    fn marshal_str(&self, value: &str) -> Result<Vec<u8>, MarshalError> {
        let mut out = Vec::with_capacity(value.len() + 5);
        write_str(&mut out, value)?;
        Ok(out)
    }

    fn marshal_bool(&self, value: bool) -> Result<Vec<u8>, MarshalError> {
        Ok(vec![if value { TRUE } else { FALSE }])
    }

    fn marshal_list(&self, value: &[String]) -> Result<Vec<u8>, MarshalError> {
        let mut out = Vec::new();
        write_value(&mut out, &Value::List(value.to_vec()))?;
        Ok(out)
    }

    fn marshal_dict(&self, value: &Dict) -> Result<Vec<u8>, MarshalError> {
        let mut out = Vec::new();
        write_container_header(&mut out, value.len(), 0x80, MAP16, MAP32)?;
        for (key, entry) in value {
            write_str(&mut out, key)?;
            write_value(&mut out, entry)?;
        }
        Ok(out)
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
