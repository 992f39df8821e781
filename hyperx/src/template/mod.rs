//! Template primitives shared by components and JSON rendering
//!
//! - [`naming`]: component name validation and derivation from file names
//! - [`extract`]: `<template>` / `<style>` block extraction and splicing
//! - [`interpolate`](mod@interpolate): `{{ dotted.path }}` substitution
//! - [`fragment`]: an owned HTML fragment model backed by `html5ever`

pub mod extract;
pub mod fragment;
pub mod interpolate;
pub mod naming;

pub use extract::{extract_style_content, extract_template_content, splice_style_block};
pub use fragment::{Element, Fragment, Node};
pub use interpolate::{interpolate, lookup_path, value_to_string, Interpolator, PlaceholderInterpolator};
pub use naming::{file_stem, filename_to_component_name, is_valid_component_name};
