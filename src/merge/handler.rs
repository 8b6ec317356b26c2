//! Pluggable per-extension merge behaviour.
//!
//! Handlers are consulted by name before the built-in type based merge of
//! an extension. Every registered handler also gets a post-processing call
//! for each extension of a merged feature, whether or not it took part in
//! the merge, which is where derived state such as region maps is computed.

use crate::error::Result;
use crate::model::Feature;

/// Extension specific merge and post-processing.
///
/// All methods have no-op defaults so a handler only implements what it
/// needs.
pub trait ExtensionHandler {
    /// Whether this handler merges the extension called `name`.
    fn can_merge(&self, _name: &str) -> bool {
        false
    }

    /// Merge extension `name` of `source` into `target`.
    ///
    /// The target may not have the extension yet; the handler is then
    /// responsible for creating it.
    fn merge(&self, _target: &mut Feature, _source: &Feature, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Called once for every extension name present in a merged feature.
    fn post_process(&self, _feature: &mut Feature, _name: &str) -> Result<()> {
        Ok(())
    }
}

/// Ordered registry of extension handlers.
#[derive(Default)]
pub struct ExtensionHandlers {
    handlers: Vec<Box<dyn ExtensionHandler>>,
}

impl ExtensionHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn ExtensionHandler>) {
        self.handlers.push(handler);
    }

    pub fn with(mut self, handler: impl ExtensionHandler + 'static) -> Self {
        self.register(Box::new(handler));
        self
    }

    /// The first handler willing to merge `name`.
    pub fn merger_for(&self, name: &str) -> Option<&dyn ExtensionHandler> {
        self.handlers
            .iter()
            .find(|h| h.can_merge(name))
            .map(|h| h.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ExtensionHandler> {
        self.handlers.iter().map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for ExtensionHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionHandlers")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
