//! MIME-type registry: maps each content type to its handler factory.
//!
//! The table is built once and read-only thereafter. The process-wide
//! default lives behind a `OnceLock`; callers that need an extra strategy
//! build their own table with [`HandlerRegistry::with_defaults`] +
//! [`HandlerRegistry::register`] and either use it directly or
//! [`HandlerRegistry::install`] it as the process default before first
//! use.

use std::sync::OnceLock;

use crate::error::UnsupportedMediaType;
use crate::handler::ContentHandler;
use crate::handlers::{
    form, json, msgpack, pickle, xml, yaml, FormHandler, JsonHandler, MsgPackHandler,
    PickleHandler, XmlHandler, YamlHandler,
};

/// Constructs a fresh handler instance. Handlers are stateless and cheap,
/// so the registry stores factories rather than shared instances.
pub type HandlerFactory = fn() -> Box<dyn ContentHandler>;

static GLOBAL: OnceLock<HandlerRegistry> = OnceLock::new();

/// Read-only table from MIME type to handler factory.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    entries: Vec<(String, HandlerFactory)>,
}

impl HandlerRegistry {
    /// An empty registry. Most callers want [`HandlerRegistry::with_defaults`].
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A registry holding every built-in strategy.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(json::MIME_TYPE, || Box::new(JsonHandler::new()));
        registry.register(form::MIME_TYPE, || Box::new(FormHandler::new()));
        registry.register(yaml::MIME_TYPE, || Box::new(YamlHandler::new()));
        registry.register(xml::MIME_TYPE, || Box::new(XmlHandler::new()));
        registry.register(pickle::MIME_TYPE, || Box::new(PickleHandler::new()));
        registry.register(msgpack::MIME_TYPE, || Box::new(MsgPackHandler::new()));
        registry
    }

    /// Register `factory` under `mime`, replacing any existing entry.
    pub fn register(&mut self, mime: impl Into<String>, factory: HandlerFactory) {
        let mime = mime.into();
        self.entries.retain(|(existing, _)| *existing != mime);
        self.entries.push((mime, factory));
    }

    /// Construct the handler registered for `mime`.
    pub fn handler(&self, mime: &str) -> Result<Box<dyn ContentHandler>, UnsupportedMediaType> {
        self.entries
            .iter()
            .find(|(registered, _)| registered == mime)
            .map(|(_, factory)| factory())
            .ok_or_else(|| UnsupportedMediaType(mime.to_owned()))
    }

    /// The registered MIME types, in registration order.
    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(mime, _)| mime.as_str())
    }

    /// Install this registry as the process-wide default. Fails, handing
    /// the registry back, if the default is already initialized — the
    /// table is append-before-first-use only.
    pub fn install(self) -> Result<(), HandlerRegistry> {
        GLOBAL.set(self)
    }

    /// The process-wide default registry, built with the built-in
    /// strategies on first use unless [`HandlerRegistry::install`] ran
    /// earlier.
    pub fn global() -> &'static HandlerRegistry {
        GLOBAL.get_or_init(Self::with_defaults)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
