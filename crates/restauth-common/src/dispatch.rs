//! Dispatch facade: one marshal or unmarshal call per MIME type.
//!
//! The free functions operate on the process-wide default registry;
//! equivalent methods exist on [`HandlerRegistry`] for callers holding a
//! custom table. The keyed-dictionary operations let the HTTP layer
//! strictly reject request bodies carrying unexpected or missing fields.

use thiserror::Error;

use crate::error::{MarshalError, UnmarshalError, UnsupportedMediaType};
use crate::registry::HandlerRegistry;
use crate::value::{Kind, Value};

/// Failure surfaced by the facade: one of the two handler error kinds,
/// forwarded unchanged, or a MIME type with no registered handler.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    #[error(transparent)]
    Unmarshal(#[from] UnmarshalError),
    #[error(transparent)]
    UnsupportedMediaType(#[from] UnsupportedMediaType),
}

impl HandlerRegistry {
    /// Encode `value` with the handler registered for `mime`.
    pub fn marshal(&self, mime: &str, value: &Value) -> Result<Vec<u8>, DispatchError> {
        let handler = self.handler(mime)?;
        Ok(handler.marshal(value)?)
    }

    /// Decode `data` as a value of `kind` with the handler registered for
    /// `mime`.
    pub fn unmarshal(&self, mime: &str, data: &[u8], kind: Kind) -> Result<Value, DispatchError> {
        let handler = self.handler(mime)?;
        Ok(handler.unmarshal(data, kind)?)
    }

    /// Decode `data` as a dictionary that must contain exactly `keys`;
    /// returns the values in the order the keys were given.
    ///
    /// A key-set mismatch is a [`MarshalError`] — the original protocol's
    /// deliberate choice of kind for this failure.
    pub fn unmarshal_dict_with_keys(
        &self,
        mime: &str,
        data: &[u8],
        keys: &[&str],
    ) -> Result<Vec<Value>, DispatchError> {
        let mut dict = match self.unmarshal(mime, data, Kind::Dict)? {
            Value::Dict(dict) => dict,
            // unreachable past the generic unmarshal post-condition
            other => {
                return Err(UnmarshalError::kind_mismatch(other.kind(), Kind::Dict).into());
            }
        };
        if dict.len() != keys.len() {
            return Err(MarshalError::new("did not find expected keys in body").into());
        }
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            match dict.remove(*key) {
                Some(value) => values.push(value),
                None => {
                    return Err(MarshalError::new("did not find expected keys in body").into());
                }
            }
        }
        Ok(values)
    }

    /// Decode `data` as a dictionary containing exactly `key`, returning
    /// that entry's value directly.
    pub fn unmarshal_dict_with_key(
        &self,
        mime: &str,
        data: &[u8],
        key: &str,
    ) -> Result<Value, DispatchError> {
        let mut values = self.unmarshal_dict_with_keys(mime, data, &[key])?;
        match values.pop() {
            Some(value) => Ok(value),
            None => Err(MarshalError::new("did not find expected keys in body").into()),
        }
    }
}

/// Encode `value` with the default registry's handler for `mime`.
pub fn marshal(mime: &str, value: &Value) -> Result<Vec<u8>, DispatchError> {
    HandlerRegistry::global().marshal(mime, value)
}

/// Decode `data` as a value of `kind` with the default registry's handler
/// for `mime`.
pub fn unmarshal(mime: &str, data: &[u8], kind: Kind) -> Result<Value, DispatchError> {
    HandlerRegistry::global().unmarshal(mime, data, kind)
}

/// See [`HandlerRegistry::unmarshal_dict_with_keys`].
pub fn unmarshal_dict_with_keys(
    mime: &str,
    data: &[u8],
    keys: &[&str],
) -> Result<Vec<Value>, DispatchError> {
    HandlerRegistry::global().unmarshal_dict_with_keys(mime, data, keys)
}

/// See [`HandlerRegistry::unmarshal_dict_with_key`].
pub fn unmarshal_dict_with_key(mime: &str, data: &[u8], key: &str) -> Result<Value, DispatchError> {
    HandlerRegistry::global().unmarshal_dict_with_key(mime, data, key)
}
