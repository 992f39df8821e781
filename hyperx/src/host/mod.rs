//! Host integration
//!
//! HyperX does not own a DOM. The page (a browser binding, a test harness,
//! or the CLI) implements [`HtmxHost`] to define custom elements and to hand
//! freshly rendered markup to the HTMX attribute processor.
//!
//! [`RecordingHost`] is compiled only with the `test-util` feature.

#[cfg(any(test, feature = "test-util"))]
use parking_lot::Mutex;
use thiserror::Error;

use crate::template::{Element, Fragment};

/// Errors reported by a host
#[derive(Debug, Error)]
pub enum HostError {
    /// The attribute processor is not available on the page
    #[error("htmx is not available: {0}")]
    Unavailable(String),

    /// The host rejected an operation
    #[error("host operation failed: {0}")]
    Failed(String),
}

/// The page-side collaborator
pub trait HtmxHost: Send + Sync {
    /// Register a custom element definition for `tag`
    fn define_element(&self, tag: &str) -> Result<(), HostError> {
        tracing::trace!(tag, "define_element (no-op host default)");
        Ok(())
    }

    /// Wire declarative `hx-*` attributes inside freshly rendered content
    ///
    /// `scope` is the tag of the component whose shadow root holds `content`.
    fn process(&self, scope: &str, content: &Fragment) -> Result<(), HostError>;

    /// Dispatch a synthetic event (e.g. `load`) on an element
    fn trigger(&self, element: &Element, event: &str) -> Result<(), HostError>;
}

/// Host that only logs, for offline rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl HtmxHost for NullHost {
    fn process(&self, scope: &str, content: &Fragment) -> Result<(), HostError> {
        tracing::trace!(scope, nodes = content.nodes.len(), "process (null host)");
        Ok(())
    }

    fn trigger(&self, element: &Element, event: &str) -> Result<(), HostError> {
        tracing::trace!(tag = %element.tag, id = ?element.id(), event, "trigger (null host)");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-util"))]
/// A host call captured by [`RecordingHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// `define_element(tag)`
    Define(String),
    /// `process(scope, markup)`
    Process(String, String),
    /// `trigger(element markup, event)`
    Trigger(String, String),
}

#[cfg(any(test, feature = "test-util"))]
/// Host that records every call, for tests
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    fail_process: bool,
}

#[cfg(any(test, feature = "test-util"))]
impl RecordingHost {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose `process` always fails
    #[must_use]
    pub fn failing_process() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_process: true,
        }
    }

    /// Calls recorded so far
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl HtmxHost for RecordingHost {
    fn define_element(&self, tag: &str) -> Result<(), HostError> {
        self.calls.lock().push(HostCall::Define(tag.to_string()));
        Ok(())
    }

    fn process(&self, scope: &str, content: &Fragment) -> Result<(), HostError> {
        self.calls
            .lock()
            .push(HostCall::Process(scope.to_string(), content.to_html()));
        if self.fail_process {
            return Err(HostError::Unavailable("htmx.process is not defined".into()));
        }
        Ok(())
    }

    fn trigger(&self, element: &Element, event: &str) -> Result<(), HostError> {
        self.calls
            .lock()
            .push(HostCall::Trigger(element.outer_html(), event.to_string()));
        Ok(())
    }
}

/// Whether an `hx-trigger` value includes a `load` trigger
///
/// ```rust
/// use hyperx::host::triggers_on_load;
///
/// assert!(triggers_on_load("click, load delay:1s"));
/// assert!(!triggers_on_load("loaded"));
/// ```
#[must_use]
pub fn triggers_on_load(trigger: &str) -> bool {
    trigger
        .split(',')
        .any(|spec| spec.split_whitespace().next() == Some("load"))
}

/// Whether the element carries any `hx-*` attribute
#[must_use]
pub fn has_htmx_attributes(element: &Element) -> bool {
    element.attrs.iter().any(|(name, _)| name.starts_with("hx-"))
}

/// Copy every `hx-*` attribute from `source` onto `target`
pub fn copy_htmx_attributes(source: &Element, target: &mut Element) {
    for (name, value) in source.attrs.iter().filter(|(n, _)| n.starts_with("hx-")) {
        target.set_attr(name.clone(), value.clone());
    }
}

/// Strip every `hx-*` attribute from the element
pub fn remove_htmx_attributes(element: &mut Element) {
    element.attrs.retain(|(name, _)| !name.starts_with("hx-"));
}
