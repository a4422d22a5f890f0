//! Content handlers for the RestAuth wire protocol.
//!
//! The protocol exchanges four shapes of data — strings, booleans, lists
//! of strings, and string-keyed dictionaries — over a negotiated MIME
//! type. This crate owns the marshalling layer: the [`Value`] model, the
//! [`ContentHandler`] contract every wire format satisfies, the concrete
//! strategies (JSON, form-urlencoded, YAML, XML, pickle, MessagePack),
//! and the dispatch facade the HTTP layer calls with nothing but a MIME
//! type, a byte buffer and an expected kind.
//!
//! Exactly two error kinds escape the handlers: [`MarshalError`] and
//! [`UnmarshalError`]. The facade adds [`UnsupportedMediaType`] for MIME
//! types with no registered handler.
//!
//! # Example
//!
//! ```
//! use restauth_common::{marshal, unmarshal, Kind, Value};
//!
//! let body = marshal("application/json", &Value::Str("alice".into())).unwrap();
//! assert_eq!(body, b"[\"alice\"]");
//!
//! let back = unmarshal("application/json", &body, Kind::Str).unwrap();
//! assert_eq!(back, Value::Str("alice".into()));
//! ```

pub mod dispatch;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod registry;
pub mod value;

pub use dispatch::{
    marshal, unmarshal, unmarshal_dict_with_key, unmarshal_dict_with_keys, DispatchError,
};
pub use error::{MarshalError, UnmarshalError, UnsupportedMediaType};
pub use handler::ContentHandler;
pub use handlers::{
    FormHandler, JsonHandler, MsgPackHandler, PickleHandler, XmlHandler, YamlHandler,
};
pub use registry::{HandlerFactory, HandlerRegistry};
pub use value::{Dict, Kind, Value};
