//! JSON responses rendered through `<template>` elements
//!
//! When a request answers with `application/json`, the payload is rendered
//! through the target's template instead of being swapped in as HTML:
//!
//! ```html
//! <ul id="users" hx-get="/api/users" hx-trigger="load">
//!   <template>
//!     <li>{{ name }} ({{ role }})</li>
//!     <li hx-if="empty">No users yet</li>
//!     <li hx-if="error">Could not load users: {{ error }}</li>
//!   </template>
//! </ul>
//! ```
//!
//! An empty array selects the `empty` branch, an object with a truthy
//! `error` field the `error` branch, and anything else the remaining
//! children, once per array item.

mod classify;
mod interceptor;
mod proxy;
mod renderer;
mod store;

use thiserror::Error;

pub use classify::{classify, is_truthy, Branches, RenderCase, BRANCH_ATTRIBUTE};
pub use interceptor::{JsonInterceptor, ResponseEvent, SwapDecision, JSON_CONTENT_TYPE};
pub use proxy::{needs_proxy, ProxySetup, TemplateProxies, PROXY_SUFFIX};
pub use renderer::{JsonRenderer, Rendered, TemplateSource, CONTAINER_CLASS};
pub use store::TemplateStore;

/// Why a JSON response was not rendered
#[derive(Debug, Error)]
pub enum JrxError {
    /// No element carries the target id
    #[error("render target not found: #{0}")]
    TargetNotFound(String),

    /// No template applies to the target
    #[error("no <template> found in or for {0}")]
    NoTemplate(String),

    /// The response body is not valid JSON
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
