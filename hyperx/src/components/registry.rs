//! Component template registry
//!
//! Maps validated component names to the markup extracted from their
//! `<template>` block. Cloning the registry shares the underlying map.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::template::{extract_template_content, filename_to_component_name};

/// Why a component could not be registered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// The file name does not yield a valid kebab-case name with a hyphen
    #[error("invalid component name derived from '{0}': must be kebab-case and contain a hyphen")]
    InvalidName(String),

    /// The source has no non-empty `<template>` block
    #[error("no valid template found in component file '{0}'")]
    MissingTemplate(String),
}

/// Registry of component templates keyed by tag name
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: Arc<RwLock<HashMap<String, String>>>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

impl ComponentRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component from its file name and raw source
    ///
    /// Returns `false` (and logs why) when the name is invalid or the source
    /// has no template. Re-registering a name overwrites it.
    pub fn register(&self, filename: &str, raw_content: &str) -> bool {
        match self.try_register(filename, raw_content) {
            Ok(name) => {
                tracing::info!(component = %name, "Registered component");
                true
            }
            Err(err) => {
                tracing::error!(file = filename, error = %err, "Failed to register component");
                false
            }
        }
    }

    /// Register a component, returning the derived name or the reason it failed
    pub fn try_register(&self, filename: &str, raw_content: &str) -> Result<String, RegistrationError> {
        let name = filename_to_component_name(filename);
        if name.is_empty() {
            return Err(RegistrationError::InvalidName(filename.to_string()));
        }

        let template = extract_template_content(raw_content)
            .ok_or_else(|| RegistrationError::MissingTemplate(filename.to_string()))?;

        tracing::debug!(component = %name, chars = template.len(), "Extracted template content");
        self.components.write().insert(name.clone(), template);
        Ok(name)
    }

    /// Template markup for a component
    #[must_use]
    pub fn get_template(&self, name: &str) -> Option<String> {
        self.components.read().get(name).cloned()
    }

    /// Whether a component is registered
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.components.read().contains_key(name)
    }

    /// Registered component names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered components
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.read().len()
    }

    /// Whether no component is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.read().is_empty()
    }

    /// Remove every registered component
    pub fn clear(&self) {
        self.components.write().clear();
    }
}
