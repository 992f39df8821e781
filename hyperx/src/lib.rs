//! hyperx: HTML components and JSON templates for htmx applications
//!
//! hyperx extends an htmx page with two things:
//!
//! - **Components**: `.hpx` files holding a `<template>` (and optionally a
//!   `<style>`) become custom elements. `<user-card data='{"name":"Ada"}'>`
//!   renders the `UserCard.hpx` template with `{{ name }}` filled in.
//! - **JSON templates**: a request answered with `application/json` is
//!   rendered through the target's `<template>`, with `hx-if="empty"` and
//!   `hx-if="error"` fallback branches.
//!
//! hyperx owns no DOM. Pages are [`Fragment`](template::Fragment)s and
//! the page-side collaborator is an [`HtmxHost`](host::HtmxHost).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hyperx::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     hyperx::observability::init()?;
//!
//!     let config = HyperxConfig::load_from("./hpxconfig.json")?;
//!     let transport = Arc::new(FsTransport::new("./site"));
//!     let state = HyperxState::new(config, transport, Arc::new(NullHost));
//!     state.initialize().await?;
//!
//!     let (card, _) = state
//!         .binder()
//!         .mount("user-card", [("data", r#"{"name":"Ada"}"#)])
//!         .expect("user-card is defined");
//!     println!("{}", card.shadow_html());
//!     Ok(())
//! }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod components;
pub mod config;
pub mod error;
pub mod host;
pub mod jrx;
pub mod observability;
pub mod paths;
pub mod state;
pub mod template;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use hyperx::prelude::*;
    //! ```

    pub use crate::components::{
        ComponentElement, ComponentLoader, ComponentRegistry, CustomElementBinder, FsTransport,
        HttpTransport, LoadReport, RenderOutcome, Transport,
    };
    pub use crate::config::{HyperxConfig, RenderSettings};
    pub use crate::error::{HyperxError, Result};
    pub use crate::host::{HtmxHost, NullHost};
    pub use crate::jrx::{JsonInterceptor, JsonRenderer, ResponseEvent, SwapDecision, TemplateStore};
    pub use crate::paths::PathResolver;
    pub use crate::state::HyperxState;
    pub use crate::template::{Element, Fragment, Interpolator};
}
