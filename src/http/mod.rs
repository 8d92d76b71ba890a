//! HTTP protocol layer module
//!
//! Content-type detection, validators, range parsing and response builders,
//! decoupled from the adapters that use them.

pub mod cache;
pub mod content;
pub mod date;
pub mod mime;
pub mod range;
pub mod response;

pub use content::serve_content;
pub use response::{build_404_response, build_500_response, Body};
