//! Request proxies for templates
//!
//! htmx does not process attributes on `<template>` elements. A template
//! that declares a request (`hx-get`, `hx-post`, `hx-put`, `hx-delete`) gets
//! a hidden `div` sibling, `{id}-proxy`, that carries the `hx-*` attributes
//! instead and targets the template by default.

use std::sync::Arc;
use std::time::Duration;

use crate::config::RenderSettings;
use crate::host::{copy_htmx_attributes, remove_htmx_attributes, triggers_on_load, HtmxHost};
use crate::template::{Element, Fragment, Node};

/// Suffix appended to a template id to form its proxy's id
pub const PROXY_SUFFIX: &str = "-proxy";

const REQUEST_ATTRIBUTES: [&str; 4] = ["hx-get", "hx-post", "hx-put", "hx-delete"];

/// Whether a template declares a request of its own
#[must_use]
pub fn needs_proxy(element: &Element) -> bool {
    element.is_template() && REQUEST_ATTRIBUTES.iter().any(|attr| element.has_attr(attr))
}

/// Proxies created by one setup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySetup {
    /// Ids of the proxies inserted
    pub created: Vec<String>,
    /// Proxies whose trigger includes `load`
    pub pending_load: Vec<Element>,
}

/// Creates template proxies and fires their `load` triggers
#[derive(Clone)]
pub struct TemplateProxies {
    host: Arc<dyn HtmxHost>,
    delay: Duration,
}

impl std::fmt::Debug for TemplateProxies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateProxies")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl TemplateProxies {
    /// Create with an explicit trigger delay
    #[must_use]
    pub const fn new(host: Arc<dyn HtmxHost>, delay: Duration) -> Self {
        Self { host, delay }
    }

    /// Create with the delay from render settings
    #[must_use]
    pub fn from_settings(host: Arc<dyn HtmxHost>, settings: &RenderSettings) -> Self {
        Self::new(host, Duration::from_millis(settings.proxy_trigger_delay_ms))
    }

    /// Insert a proxy after every template that needs one
    ///
    /// Templates without an id, or whose proxy already exists, are skipped.
    pub fn setup(&self, page: &mut Fragment) -> ProxySetup {
        for template in page.find_all(&|el| needs_proxy(el) && el.id().is_none()) {
            tracing::warn!(tag = %template.tag, "Template with request attributes has no id, skipping proxy");
        }

        let mut setup = ProxySetup::default();
        loop {
            let candidate = page.locate(&|el| {
                needs_proxy(el)
                    && el
                        .id()
                        .is_some_and(|id| page.find_by_id(&format!("{id}{PROXY_SUFFIX}")).is_none())
            });
            let Some(path) = candidate else { break };
            let Some(proxy) = insert_proxy(page, &path) else { break };

            let proxy_id = proxy.id().unwrap_or_default().to_string();
            tracing::debug!(proxy = %proxy_id, "Set up template proxy");
            if proxy.attr("hx-trigger").is_none_or(triggers_on_load) {
                setup.pending_load.push(proxy);
            }
            setup.created.push(proxy_id);
        }
        setup
    }

    /// Wait for the configured delay, then trigger `load` on each proxy
    pub async fn fire_load(&self, proxies: Vec<Element>) {
        if proxies.is_empty() {
            return;
        }
        tokio::time::sleep(self.delay).await;
        for proxy in &proxies {
            tracing::debug!(proxy = ?proxy.id(), "Auto-triggering template");
            if let Err(err) = self.host.trigger(proxy, "load") {
                tracing::error!(proxy = ?proxy.id(), error = %err, "Failed to trigger template proxy");
            }
        }
    }

    /// Run [`TemplateProxies::fire_load`] in the background
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn schedule(&self, proxies: Vec<Element>) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.fire_load(proxies).await })
    }
}

fn insert_proxy(page: &mut Fragment, path: &[usize]) -> Option<Element> {
    let template = page.element_at_mut(path)?;
    let id = template.id()?.to_string();

    let mut proxy = Element::new("div");
    proxy.hide();
    proxy.set_attr("id", format!("{id}{PROXY_SUFFIX}"));
    copy_htmx_attributes(template, &mut proxy);
    remove_htmx_attributes(template);
    if !proxy.has_attr("hx-target") {
        proxy.set_attr("hx-target", format!("#{id}"));
    }

    let (siblings, idx) = page.siblings_at_mut(path)?;
    siblings.insert(idx + 1, Node::Element(proxy.clone()));
    Some(proxy)
}
