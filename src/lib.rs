//! Rendering and static-asset adapters for hyper services.
//!
//! - [`render::TemplateRenderer`] renders minijinja templates from a
//!   directory, caching compiled templates unless running in debug mode.
//! - [`handler::StaticFiles`] wraps a downstream service and serves assets
//!   from an [`handler::AssetSource`] under a URL prefix.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod render;

pub use error::{AssetError, RenderError, RenderResult};
pub use handler::{AssetSource, EmbeddedAssets, StaticFiles, StaticOptions, StaticService};
pub use render::{Render, RenderOptions, TemplateRenderer};
