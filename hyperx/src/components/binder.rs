//! Binding registered components to custom element definitions
//!
//! Each component tag is defined at most once. Discovery of components that
//! enter the page later is explicit: the host calls
//! [`CustomElementBinder::notify_inserted`] with the tag names it saw.

use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::element::{ComponentElement, RenderOutcome};
use super::registry::ComponentRegistry;
use crate::config::RenderSettings;
use crate::host::HtmxHost;
use crate::template::{is_valid_component_name, Interpolator, PlaceholderInterpolator};

/// Defines custom elements for registered components and drives their rendering
pub struct CustomElementBinder {
    registry: ComponentRegistry,
    host: Arc<dyn HtmxHost>,
    interpolator: Arc<dyn Interpolator>,
    settings: RenderSettings,
    defined: RwLock<BTreeSet<String>>,
}

impl std::fmt::Debug for CustomElementBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomElementBinder")
            .field("defined", &*self.defined.read())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CustomElementBinder {
    /// Create a binder using the default placeholder interpolator
    pub fn new(registry: ComponentRegistry, host: Arc<dyn HtmxHost>, settings: RenderSettings) -> Self {
        Self {
            registry,
            host,
            interpolator: Arc::new(PlaceholderInterpolator),
            settings,
            defined: RwLock::new(BTreeSet::new()),
        }
    }

    /// Replace the interpolator
    #[must_use]
    pub fn with_interpolator(mut self, interpolator: Arc<dyn Interpolator>) -> Self {
        self.interpolator = interpolator;
        self
    }

    /// The component registry templates are read from
    #[must_use]
    pub const fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// The page host
    #[must_use]
    pub fn host(&self) -> &dyn HtmxHost {
        self.host.as_ref()
    }

    /// The interpolator used for placeholders
    #[must_use]
    pub fn interpolator(&self) -> &dyn Interpolator {
        self.interpolator.as_ref()
    }

    /// Render settings (attribute names)
    #[must_use]
    pub const fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Attributes whose changes trigger a re-render
    #[must_use]
    pub fn observed_attributes(&self) -> [&str; 2] {
        [
            self.settings.data_attribute.as_str(),
            self.settings.trigger_attribute.as_str(),
        ]
    }

    /// Define the custom element for a registered component
    ///
    /// Returns `false` for invalid or unregistered names, for names that are
    /// already defined (logged as a warning), and when the host refuses.
    pub fn define(&self, name: &str) -> bool {
        if !is_valid_component_name(name) {
            tracing::error!(component = name, "Refusing to define invalid component name");
            return false;
        }
        if !self.registry.has(name) {
            tracing::error!(component = name, "Cannot define unregistered component");
            return false;
        }
        if self.is_defined(name) {
            tracing::warn!(component = name, "Component already defined, skipping");
            return false;
        }

        let mut defined = self.defined.write();
        if !defined.insert(name.to_string()) {
            tracing::warn!(component = name, "Component already defined, skipping");
            return false;
        }
        if let Err(err) = self.host.define_element(name) {
            defined.remove(name);
            tracing::error!(component = name, error = %err, "Host failed to define component");
            return false;
        }

        tracing::info!(component = name, "Defined custom element");
        true
    }

    /// Whether a tag has been defined
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.read().contains(name)
    }

    /// Defined tag names, sorted
    #[must_use]
    pub fn defined(&self) -> Vec<String> {
        self.defined.read().iter().cloned().collect()
    }

    /// Define every registered component that is not defined yet
    pub fn define_all_registered(&self) -> Vec<String> {
        self.notify_inserted(self.registry.names())
    }

    /// Bind newly inserted tags that are registered but not yet defined
    ///
    /// Returns the tags that were defined by this call.
    pub fn notify_inserted<I, S>(&self, tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bound = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().to_ascii_lowercase();
            if self.registry.has(&tag) && !self.is_defined(&tag) && self.define(&tag) {
                bound.push(tag);
            }
        }
        bound
    }

    /// Create an instance of a defined component
    #[must_use]
    pub fn create_element(&self, tag: &str) -> Option<ComponentElement> {
        let tag = tag.to_ascii_lowercase();
        self.is_defined(&tag).then(|| ComponentElement::new(tag))
    }

    /// Create, configure and connect an element in one step
    ///
    /// Returns `None` when the tag is not defined.
    pub fn mount<'a, I>(&self, tag: &str, attributes: I) -> Option<(ComponentElement, RenderOutcome)>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut element = self.create_element(tag)?;
        for (name, value) in attributes {
            element = element.with_attribute(name, value);
        }
        let outcome = element.connected(self)?;
        Some((element, outcome))
    }
}
