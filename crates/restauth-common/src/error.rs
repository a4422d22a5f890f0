//! Error kinds surfaced by the marshalling core.
//!
//! Handlers produce exactly two kinds: [`MarshalError`] when a value cannot
//! be encoded to bytes and [`UnmarshalError`] when bytes cannot be decoded
//! to the expected kind. Underlying codec failures are caught at the
//! handler boundary and carried as the error's source, never re-wrapped a
//! second time. [`UnsupportedMediaType`] is the dispatch facade's lookup
//! failure — a configuration error, not a data error.

use thiserror::Error;

use crate::value::Kind;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A value could not be encoded to bytes.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct MarshalError {
    message: String,
    #[source]
    source: Option<Cause>,
}

impl MarshalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying codec failure, preserving it as the cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Bytes could not be decoded to the expected kind.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UnmarshalError {
    message: String,
    #[source]
    source: Option<Cause>,
}

impl UnmarshalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying codec failure, preserving it as the cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The post-condition failure raised by the generic `unmarshal` when a
    /// decoder parsed successfully but produced the wrong shape.
    pub fn kind_mismatch(actual: Kind, expected: Kind) -> Self {
        Self::new(format!(
            "request body contained {actual} instead of {expected}"
        ))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// No handler is registered for the given MIME type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported media type: {0}")]
pub struct UnsupportedMediaType(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mismatch_names_both_kinds() {
        let err = UnmarshalError::kind_mismatch(Kind::List, Kind::Dict);
        assert_eq!(err.to_string(), "request body contained list instead of dict");
    }

    #[test]
    fn source_is_preserved() {
        use std::error::Error as _;

        let cause = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err = UnmarshalError::with_source("could not parse body as JSON", cause);
        assert_eq!(err.to_string(), "could not parse body as JSON");
        assert!(err.source().is_some());
    }
}
