//! Logger module
//!
//! Installs the `tracing` subscriber and provides the named log events used
//! across the crate:
//! - Server lifecycle
//! - Static asset serving
//! - Asset source and render failures

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` overrides the
/// configured level when set.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.format.as_str() {
        "json" => builder.json().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.try_init(),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        template_dir = %config.render.template_dir.display(),
        debug = config.render.debug,
        assets_prefix = %config.assets.dir,
        "server started"
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!(error = ?err, "failed to serve connection");
}

/// One line per served asset
pub fn log_static_served(path: &str) {
    tracing::info!(target: "viewkit::static", "[Static] Serving {path}");
}

pub fn log_asset_source_error(path: &str, err: &dyn std::error::Error) {
    tracing::error!(target: "viewkit::static", asset = path, error = %err, "asset source failed");
}

pub fn log_render_error(err: &crate::RenderError) {
    tracing::error!(target: "viewkit::render", error = %err, "template rendering failed");
}

pub fn log_template_compiled(path: &std::path::Path) {
    tracing::debug!(target: "viewkit::render", path = %path.display(), "template compiled");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}
