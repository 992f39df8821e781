//! `{{ dotted.path }}` placeholder substitution
//!
//! Substitution is string based and deliberately small: no loops, no
//! conditionals, no expressions. Callers go through [`Interpolator`] so the
//! implementation can be replaced without touching them.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([\w.]+)\s*\}\}").expect("Invalid regex"));

/// Replaces placeholders in markup with values looked up in JSON data
pub trait Interpolator: Send + Sync {
    /// Substitute every placeholder in `template` using `data`
    fn interpolate(&self, template: &str, data: &Value) -> String;
}

/// The default mustache-style interpolator
///
/// Missing or `null` values at any step of a dotted path substitute as the
/// empty string. Strings are inserted verbatim, numbers and booleans use
/// their JSON spelling, and objects or arrays are inserted as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderInterpolator;

impl Interpolator for PlaceholderInterpolator {
    fn interpolate(&self, template: &str, data: &Value) -> String {
        interpolate(template, data)
    }
}

/// Substitute `{{ dotted.path }}` placeholders in `template`
///
/// # Examples
///
/// ```rust
/// use hyperx::template::interpolate;
/// use serde_json::json;
///
/// assert_eq!(interpolate("<b>{{ a.b }}</b>", &json!({"a": {"b": 5}})), "<b>5</b>");
/// assert_eq!(interpolate("<b>{{a.b}}</b>", &json!({"a": {}})), "<b></b>");
/// ```
#[must_use]
pub fn interpolate(template: &str, data: &Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            lookup_path(data, &caps[1]).map_or_else(String::new, value_to_string)
        })
        .into_owned()
}

/// Resolve a dotted path against JSON data
///
/// Object keys are looked up by name and array elements by numeric index
/// (`items.0.title`). Returns `None` as soon as a step is missing or `null`.
#[must_use]
pub fn lookup_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for key in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// Render a JSON value as substitution text
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
