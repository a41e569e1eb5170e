//! The provider scope: one host, one registry, one set of defaults.
//!
//! Everything is wired by explicit dependency injection: the embedding layer
//! constructs a [`FlipScope`] once and hands it to every unit and exemption
//! declaration beneath it. There is no ambient or global lookup.

use std::rc::Rc;

use glide_host::Host;

use crate::config::ScopeOptions;
use crate::registry::FlipRegistry;

/// Shared context for all animated units under one provider.
#[derive(Debug)]
pub struct FlipScope<H: Host> {
    host: Rc<H>,
    registry: Rc<FlipRegistry>,
    defaults: ScopeOptions,
}

impl<H: Host> FlipScope<H> {
    /// Create a scope over the given host with the given defaults.
    pub fn new(host: Rc<H>, defaults: ScopeOptions) -> Rc<Self> {
        Rc::new(Self {
            host,
            registry: Rc::new(FlipRegistry::new()),
            defaults,
        })
    }

    /// The platform host.
    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    /// The shared first/last-state registry.
    pub fn registry(&self) -> &Rc<FlipRegistry> {
        &self.registry
    }

    /// The provider-level default options.
    pub fn defaults(&self) -> &ScopeOptions {
        &self.defaults
    }
}
