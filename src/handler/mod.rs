//! Request handler module
//!
//! The static asset middleware and the asset sources it reads from.

pub mod embedded;
pub mod static_files;

pub use embedded::EmbeddedAssets;
pub use static_files::{AssetSource, StaticFiles, StaticOptions, StaticService};
