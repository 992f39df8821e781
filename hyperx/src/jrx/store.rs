//! Template snapshots that survive DOM replacement
//!
//! A target's inline `<template>` is destroyed the first time a response is
//! rendered into it. Snapshots are taken at page load and again before
//! every request so the template can be restored afterwards. The store
//! only grows.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::template::{Element, Fragment};

/// Page-wide map from element id to template snapshot
#[derive(Clone, Default)]
pub struct TemplateStore {
    templates: Arc<RwLock<HashMap<String, Element>>>,
}

impl std::fmt::Debug for TemplateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let templates = self.templates.read();
        let mut keys: Vec<_> = templates.keys().collect();
        keys.sort();
        f.debug_struct("TemplateStore").field("keys", &keys).finish()
    }
}

impl TemplateStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot, replacing any previous one under the same key
    pub fn insert(&self, key: impl Into<String>, template: Element) {
        self.templates.write().insert(key.into(), template);
    }

    /// A copy of the stored snapshot
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Element> {
        self.templates.read().get(key).cloned()
    }

    /// Whether a snapshot exists for `key`
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.templates.read().contains_key(key)
    }

    /// Number of snapshots
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }

    /// Snapshot every `template[name]`, `template[data-for]` and
    /// `template[id]` in the page
    ///
    /// Later passes overwrite earlier ones, so an `id` wins over a `name`
    /// with the same value. Returns the number of snapshots taken.
    pub fn scan(&self, page: &Fragment) -> usize {
        let templates = page.find_all(&Element::is_template);
        let mut stored = 0;
        for attribute in ["name", "data-for", "id"] {
            for template in &templates {
                if let Some(key) = template.attr(attribute).filter(|k| !k.is_empty()) {
                    tracing::debug!(key, attribute, "Stored template");
                    self.insert(key, (*template).clone());
                    stored += 1;
                }
            }
        }
        stored
    }

    /// Snapshot the template a request for `target_id` will need
    ///
    /// Looks for a template inside the target, then `template[name=id]`,
    /// then `template[data-for=id]`. Returns whether anything was stored.
    pub fn capture_before_request(&self, page: &Fragment, target_id: &str) -> bool {
        if target_id.is_empty() {
            return false;
        }

        let found = page
            .find_by_id(target_id)
            .and_then(|target| target.find_descendant(&Element::is_template))
            .map(|t| (t, "inline"))
            .or_else(|| {
                page.find(&|el| el.is_template() && el.attr("name") == Some(target_id))
                    .map(|t| (t, "name"))
            })
            .or_else(|| {
                page.find(&|el| el.is_template() && el.attr("data-for") == Some(target_id))
                    .map(|t| (t, "data-for"))
            });

        match found {
            Some((template, source)) => {
                tracing::debug!(target = target_id, source, "Stored template before request");
                self.insert(target_id, template.clone());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div id="users"><template><li>{{name}}</li></template></div>
        <template name="posts"><p>{{title}}</p></template>
        <template data-for="comments"><q>{{body}}</q></template>
        <template id="tags"><b>{{tag}}</b></template>
        <div id="empty"></div>
    "#;

    #[test]
    fn test_scan_named_referenced_and_id_templates() {
        let store = TemplateStore::new();
        let page = Fragment::parse(PAGE);

        assert_eq!(store.scan(&page), 3);
        assert!(store.contains("posts"));
        assert!(store.contains("comments"));
        assert!(store.contains("tags"));
        assert!(!store.contains("users"));
        assert_eq!(store.get("posts").unwrap().inner_html(), "<p>{{title}}</p>");
    }

    #[test]
    fn test_capture_prefers_inline_template() {
        let store = TemplateStore::new();
        let page = Fragment::parse(PAGE);

        assert!(store.capture_before_request(&page, "users"));
        assert_eq!(store.get("users").unwrap().inner_html(), "<li>{{name}}</li>");
    }

    #[test]
    fn test_capture_falls_back_to_name_then_data_for() {
        let store = TemplateStore::new();
        let page = Fragment::parse(PAGE);

        assert!(store.capture_before_request(&page, "posts"));
        assert!(store.capture_before_request(&page, "comments"));
        assert_eq!(store.get("comments").unwrap().inner_html(), "<q>{{body}}</q>");
    }

    #[test]
    fn test_capture_without_template() {
        let store = TemplateStore::new();
        let page = Fragment::parse(PAGE);

        assert!(!store.capture_before_request(&page, "empty"));
        assert!(!store.capture_before_request(&page, ""));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = TemplateStore::new();
        let other = store.clone();
        store.insert("a", Element::new("template"));
        assert_eq!(other.len(), 1);
    }
}
