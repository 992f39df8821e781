//! Payload classification and fallback partitioning

use serde_json::Value;

use crate::template::Element;

/// Attribute marking a fallback branch on a template's direct child
pub const BRANCH_ATTRIBUTE: &str = "hx-if";

/// Which branch of a template a payload selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderCase {
    /// An empty array
    Empty,
    /// An object with a truthy `error` field
    Error,
    /// Anything else
    Normal,
}

impl RenderCase {
    /// The `hx-if` value of the fallback branch, if any
    #[must_use]
    pub const fn branch(self) -> Option<&'static str> {
        match self {
            Self::Empty => Some("empty"),
            Self::Error => Some("error"),
            Self::Normal => None,
        }
    }
}

/// Classify a JSON payload
///
/// ```rust
/// use hyperx::jrx::{classify, RenderCase};
/// use serde_json::json;
///
/// assert_eq!(classify(&json!([])), RenderCase::Empty);
/// assert_eq!(classify(&json!({"error": "not found"})), RenderCase::Error);
/// assert_eq!(classify(&json!([{"x": 1}])), RenderCase::Normal);
/// ```
#[must_use]
pub fn classify(json: &Value) -> RenderCase {
    match json {
        Value::Array(items) if items.is_empty() => RenderCase::Empty,
        Value::Object(map) if map.get("error").is_some_and(is_truthy) => RenderCase::Error,
        _ => RenderCase::Normal,
    }
}

/// Truthiness as a browser script would see it
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A template's direct children split by branch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branches {
    /// Children marked `hx-if="empty"`
    pub empty: Vec<Element>,
    /// Children marked `hx-if="error"`
    pub error: Vec<Element>,
    /// Every other child element
    pub main: Vec<Element>,
}

impl Branches {
    /// Partition a template's child elements; text between them is dropped
    #[must_use]
    pub fn partition(template: &Element) -> Self {
        let mut branches = Self::default();
        for child in template.child_elements() {
            match child.attr(BRANCH_ATTRIBUTE) {
                Some("empty") => branches.empty.push(child.clone()),
                Some("error") => branches.error.push(child.clone()),
                _ => branches.main.push(child.clone()),
            }
        }
        branches
    }

    /// The nodes a case renders
    #[must_use]
    pub fn select(&self, case: RenderCase) -> &[Element] {
        match case {
            RenderCase::Empty => &self.empty,
            RenderCase::Error => &self.error,
            RenderCase::Normal => &self.main,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Fragment;
    use serde_json::json;

    #[test]
    fn test_classify() {
        assert_eq!(classify(&json!([])), RenderCase::Empty);
        assert_eq!(classify(&json!([1])), RenderCase::Normal);
        assert_eq!(classify(&json!({"error": "x"})), RenderCase::Error);
        assert_eq!(classify(&json!({"error": true})), RenderCase::Error);
        assert_eq!(classify(&json!({"error": {"code": 1}})), RenderCase::Error);
        assert_eq!(classify(&json!({"error": ""})), RenderCase::Normal);
        assert_eq!(classify(&json!({"error": null})), RenderCase::Normal);
        assert_eq!(classify(&json!({"error": 0})), RenderCase::Normal);
        assert_eq!(classify(&json!({})), RenderCase::Normal);
        assert_eq!(classify(&json!(null)), RenderCase::Normal);
        assert_eq!(classify(&json!("text")), RenderCase::Normal);
    }

    #[test]
    fn test_branch_names() {
        assert_eq!(RenderCase::Empty.branch(), Some("empty"));
        assert_eq!(RenderCase::Error.branch(), Some("error"));
        assert_eq!(RenderCase::Normal.branch(), None);
    }

    #[test]
    fn test_partition_direct_children_only() {
        let fragment = Fragment::parse(
            r#"<template>
                <li>{{name}}</li>
                <p hx-if="empty">Nothing here</p>
                <p hx-if="error">Failed: {{error}}</p>
                <div hx-if="loading"><span hx-if="empty">nested</span></div>
            </template>"#,
        );
        let template = fragment.elements().next().unwrap();
        let branches = Branches::partition(template);

        assert_eq!(branches.empty.len(), 1);
        assert_eq!(branches.error.len(), 1);
        assert_eq!(branches.main.len(), 2);
        assert_eq!(branches.select(RenderCase::Empty)[0].text_content(), "Nothing here");
        assert_eq!(branches.select(RenderCase::Normal)[1].tag, "div");
    }
}
