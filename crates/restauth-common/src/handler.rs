//! [`ContentHandler`] — the contract every wire-format strategy satisfies.
//!
//! A strategy implements the eight kind-specific operations; the two
//! generic entry points are provided on top of them. Callers that know a
//! body's kind statically call the kind-specific method directly; callers
//! that only know the declared kind at runtime (the HTTP layer) go through
//! [`ContentHandler::marshal`] and [`ContentHandler::unmarshal`].

use crate::error::{MarshalError, UnmarshalError};
use crate::value::{Dict, Kind, Value};

/// A wire-format strategy for one MIME type.
///
/// Implementations are stateless and cheap to construct; the registry
/// builds a fresh instance per call.
pub trait ContentHandler: Send + Sync + std::fmt::Debug {
    /// The MIME type this strategy registers under.
    fn mime_type(&self) -> &'static str;

    /// Whether dictionary values may themselves be containers (nested
    /// dictionaries or lists). Strategies with a flat wire format return
    /// `false` and refuse to encode nested values rather than corrupting
    /// them.
    fn supports_nested_dicts(&self) -> bool {
        true
    }

    fn marshal_str(&self, value: &str) -> Result<Vec<u8>, MarshalError>;
    fn marshal_bool(&self, value: bool) -> Result<Vec<u8>, MarshalError>;
    fn marshal_list(&self, value: &[String]) -> Result<Vec<u8>, MarshalError>;
    fn marshal_dict(&self, value: &Dict) -> Result<Vec<u8>, MarshalError>;

    /// Decode bytes assumed to come from `marshal_str`.
    ///
    /// The kind-specific decoders return a full [`Value`] rather than a
    /// pre-narrowed type: loose parsers can legitimately produce another
    /// shape, and the generic [`ContentHandler::unmarshal`] owns the kind
    /// check.
    fn unmarshal_str(&self, data: &[u8]) -> Result<Value, UnmarshalError>;
    fn unmarshal_bool(&self, data: &[u8]) -> Result<Value, UnmarshalError>;
    fn unmarshal_list(&self, data: &[u8]) -> Result<Value, UnmarshalError>;
    fn unmarshal_dict(&self, data: &[u8]) -> Result<Value, UnmarshalError>;

    /// Encode a value of any kind, dispatching on its tag.
    fn marshal(&self, value: &Value) -> Result<Vec<u8>, MarshalError> {
        match value {
            Value::Str(s) => self.marshal_str(s),
            Value::Bool(b) => self.marshal_bool(*b),
            Value::List(items) => self.marshal_list(items),
            Value::Dict(dict) => self.marshal_dict(dict),
        }
    }

    /// Decode bytes into a value of the expected kind.
    ///
    /// After the kind-specific decoder succeeds, the result's kind must
    /// match `kind` exactly; a decoder that parses successfully but
    /// produces the wrong shape is an [`UnmarshalError`] naming both kinds.
    fn unmarshal(&self, data: &[u8], kind: Kind) -> Result<Value, UnmarshalError> {
        let value = match kind {
            Kind::Str => self.unmarshal_str(data),
            Kind::Bool => self.unmarshal_bool(data),
            Kind::List => self.unmarshal_list(data),
            Kind::Dict => self.unmarshal_dict(data),
        }?;
        if value.kind() != kind {
            return Err(UnmarshalError::kind_mismatch(value.kind(), kind));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A deliberately misbehaving strategy: every decoder "succeeds" with a
    /// list, and every encoder fails the same way regardless of entry
    /// point.
    #[derive(Debug)]
    struct LooseHandler;

    impl ContentHandler for LooseHandler {
        fn mime_type(&self) -> &'static str {
            "application/x-loose"
        }

        fn marshal_str(&self, _value: &str) -> Result<Vec<u8>, MarshalError> {
            Err(MarshalError::new("refusing to encode"))
        }

        fn marshal_bool(&self, _value: bool) -> Result<Vec<u8>, MarshalError> {
            Ok(Vec::new())
        }

        fn marshal_list(&self, _value: &[String]) -> Result<Vec<u8>, MarshalError> {
            Ok(Vec::new())
        }

        fn marshal_dict(&self, _value: &Dict) -> Result<Vec<u8>, MarshalError> {
            Ok(Vec::new())
        }

        fn unmarshal_str(&self, _data: &[u8]) -> Result<Value, UnmarshalError> {
            Ok(Value::List(Vec::new()))
        }

        fn unmarshal_bool(&self, _data: &[u8]) -> Result<Value, UnmarshalError> {
            Ok(Value::List(Vec::new()))
        }

        fn unmarshal_list(&self, _data: &[u8]) -> Result<Value, UnmarshalError> {
            Ok(Value::List(Vec::new()))
        }

        fn unmarshal_dict(&self, _data: &[u8]) -> Result<Value, UnmarshalError> {
            Ok(Value::List(Vec::new()))
        }
    }

    #[test]
    fn generic_unmarshal_rejects_wrong_shape() {
        let handler = LooseHandler;
        let err = handler.unmarshal(b"", Kind::Dict).unwrap_err();
        assert_eq!(
            err.to_string(),
            "request body contained list instead of dict"
        );
    }

    #[test]
    fn generic_unmarshal_accepts_matching_shape() {
        let handler = LooseHandler;
        let value = handler.unmarshal(b"", Kind::List).unwrap();
        assert_eq!(value, Value::List(Vec::new()));
    }

    #[test]
    fn generic_marshal_forwards_the_error_unchanged() {
        let handler = LooseHandler;
        let direct = handler.marshal_str("x").unwrap_err();
        let generic = handler.marshal(&Value::Str("x".into())).unwrap_err();
        assert_eq!(direct.to_string(), generic.to_string());
    }
}
