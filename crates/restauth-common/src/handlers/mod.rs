//! Concrete content-handler strategies, one per registered MIME type.

pub mod form;
pub mod json;
pub mod msgpack;
pub mod pickle;
pub mod xml;
pub mod yaml;

pub use form::FormHandler;
pub use json::JsonHandler;
pub use msgpack::MsgPackHandler;
pub use pickle::PickleHandler;
pub use xml::XmlHandler;
pub use yaml::YamlHandler;
