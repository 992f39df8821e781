//! Component loading, registration and custom element binding
//!
//! The pipeline runs leaf first:
//!
//! 1. [`ComponentLoader`] resolves a component's source (nested before flat
//!    layout), fetches it with its stylesheet through a [`Transport`], and
//!    scopes and merges the styles
//! 2. [`ComponentRegistry`] validates the derived tag name and stores the
//!    extracted `<template>` markup
//! 3. [`CustomElementBinder`] defines the tag with the host and renders each
//!    [`ComponentElement`] from the registry with its `data` attribute
//!
//! # Example
//!
//! ```rust
//! use hyperx::components::{ComponentRegistry, CustomElementBinder};
//! use hyperx::config::RenderSettings;
//! use hyperx::host::NullHost;
//! use std::sync::Arc;
//!
//! let registry = ComponentRegistry::new();
//! assert!(registry.register("UserCard.hpx", "<template><div>{{name}}</div></template>"));
//!
//! let binder = CustomElementBinder::new(registry, Arc::new(NullHost), RenderSettings::default());
//! assert!(binder.define("user-card"));
//!
//! let (element, _) = binder.mount("user-card", [("data", r#"{"name":"Ada"}"#)]).unwrap();
//! assert_eq!(element.shadow_html(), "<div>Ada</div>");
//! ```

pub mod binder;
pub mod element;
pub mod loader;
pub mod registry;
pub mod styles;
pub mod transport;

pub use binder::CustomElementBinder;
pub use element::{parse_data, ComponentElement, ElementRenderError, ElementState, RenderOutcome, ERROR_CLASS};
pub use loader::{ComponentLoader, LoadError, LoadReport, ResolvedPath};
pub use registry::{ComponentRegistry, RegistrationError};
pub use styles::{component_class, merge_styles, scope_css};
pub use transport::{FetchResponse, FsTransport, HttpTransport, Transport, TransportError};
