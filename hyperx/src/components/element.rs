//! Component element instances
//!
//! A [`ComponentElement`] models one occurrence of a custom tag on the page.
//! It renders once when first connected and re-renders whenever a watched
//! attribute (`data` or `trigger` by default) changes value. Rendering
//! failures are contained in the element as a visible error block.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::binder::CustomElementBinder;
use crate::host::{has_htmx_attributes, triggers_on_load, HostError};
use crate::template::{Element, Fragment, Node};

/// Class of the inline error block shown when rendering fails
pub const ERROR_CLASS: &str = "hyperx-error";

/// Lifecycle state of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementState {
    /// Not yet connected to the document
    #[default]
    Unrendered,
    /// Rendered at least once
    Rendered,
}

/// Result of one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The template rendered into the shadow root
    Rendered,
    /// No template is registered for the tag; the shadow root is empty
    MissingTemplate,
    /// Rendering failed; the shadow root holds an error block
    Failed(String),
}

/// Why a render pass failed
#[derive(Debug, thiserror::Error)]
pub enum ElementRenderError {
    /// The attribute processor rejected the rendered content
    #[error(transparent)]
    Host(#[from] HostError),
}

/// One instance of a bound custom element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    state: ElementState,
    shadow: Fragment,
    renders: usize,
}

impl ComponentElement {
    /// A fresh, unrendered element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            state: ElementState::Unrendered,
            shadow: Fragment::default(),
            renders: 0,
        }
    }

    /// Builder-style attribute setter, for elements not yet connected
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// The element's tag name
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> ElementState {
        self.state
    }

    /// Number of completed render passes
    #[must_use]
    pub const fn render_count(&self) -> usize {
        self.renders
    }

    /// An attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The rendered shadow-root content
    #[must_use]
    pub const fn shadow_root(&self) -> &Fragment {
        &self.shadow
    }

    /// Serialized shadow-root content
    #[must_use]
    pub fn shadow_html(&self) -> String {
        self.shadow.to_html()
    }

    /// Called when the element is inserted into the document
    ///
    /// Renders on first connection only.
    pub fn connected(&mut self, binder: &CustomElementBinder) -> Option<RenderOutcome> {
        if self.state == ElementState::Rendered {
            return None;
        }
        let outcome = self.render(binder);
        self.state = ElementState::Rendered;
        Some(outcome)
    }

    /// Set an attribute, notifying the element as the DOM would
    pub fn set_attribute(
        &mut self,
        binder: &CustomElementBinder,
        name: &str,
        value: impl Into<String>,
    ) -> Option<RenderOutcome> {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        let old = self.attributes.insert(name.clone(), value.clone());
        self.attribute_changed(binder, &name, old.as_deref(), Some(&value))
    }

    /// Remove an attribute, notifying the element as the DOM would
    pub fn remove_attribute(&mut self, binder: &CustomElementBinder, name: &str) -> Option<RenderOutcome> {
        let name = name.to_ascii_lowercase();
        let old = self.attributes.remove(&name);
        self.attribute_changed(binder, &name, old.as_deref(), None)
    }

    /// React to an attribute change
    ///
    /// Re-renders when a watched attribute actually changed value on an
    /// element that has already rendered. The state stays `Rendered`.
    pub fn attribute_changed(
        &mut self,
        binder: &CustomElementBinder,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) -> Option<RenderOutcome> {
        if old == new
            || self.state != ElementState::Rendered
            || !binder.observed_attributes().iter().any(|a| a.eq_ignore_ascii_case(name))
        {
            return None;
        }
        tracing::debug!(tag = %self.tag, attribute = name, "Watched attribute changed, re-rendering");
        Some(self.render(binder))
    }

    /// Run the render procedure
    pub fn render(&mut self, binder: &CustomElementBinder) -> RenderOutcome {
        let Some(template) = binder.registry().get_template(&self.tag) else {
            tracing::error!(tag = %self.tag, "No template registered for component");
            self.shadow = Fragment::default();
            return RenderOutcome::MissingTemplate;
        };

        let outcome = match self.render_template(binder, &template) {
            Ok(fragment) => {
                self.shadow = fragment;
                RenderOutcome::Rendered
            }
            Err(err) => {
                tracing::error!(tag = %self.tag, error = %err, "Error rendering component");
                self.shadow = Fragment::from_nodes(vec![Node::Element(error_block(&self.tag, &err.to_string()))]);
                RenderOutcome::Failed(err.to_string())
            }
        };
        self.renders += 1;
        outcome
    }

    fn render_template(
        &self,
        binder: &CustomElementBinder,
        template: &str,
    ) -> Result<Fragment, ElementRenderError> {
        let data_attribute = &binder.settings().data_attribute;
        let raw_data = self.attribute(data_attribute);
        let data = parse_data(raw_data);

        let markup = binder.interpolator().interpolate(template, &data);
        let mut fragment = Fragment::parse(&markup);

        if let Some(raw) = raw_data {
            fragment.walk_mut(&mut |el| {
                if has_htmx_attributes(el) && !el.has_attr(data_attribute) {
                    el.set_attr(data_attribute.clone(), raw);
                }
            });
        }

        let host = binder.host();
        host.process(&self.tag, &fragment)?;
        for el in fragment.find_all(&declares_load_trigger) {
            host.trigger(el, "load")?;
        }

        Ok(fragment)
    }
}

/// Parse a data attribute; absent or malformed JSON yields `{}`
#[must_use]
pub fn parse_data(raw: Option<&str>) -> Value {
    raw.filter(|s| !s.trim().is_empty())
        .and_then(|s| match serde_json::from_str::<Value>(s) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(error = %err, "Invalid JSON in data attribute, using empty object");
                None
            }
        })
        .unwrap_or_else(|| Value::Object(Map::new()))
}

fn declares_load_trigger(el: &Element) -> bool {
    el.attr("hx-trigger").is_some_and(triggers_on_load)
}

fn error_block(tag: &str, message: &str) -> Element {
    let mut block = Element::new("div")
        .with_attr("class", ERROR_CLASS)
        .with_attr("role", "alert")
        .with_attr("style", "color:#b00020;border:1px solid currentColor;padding:0.5em");
    block
        .children
        .push(Node::Text(format!("Error rendering <{tag}>: {message}")));
    block
}
