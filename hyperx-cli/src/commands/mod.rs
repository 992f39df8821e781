//! CLI command implementations

pub mod check;
pub mod json;
pub mod render;

pub use check::CheckCommand;
pub use json::JsonCommand;
pub use render::RenderCommand;
