// Configuration module entry point
// Loads layered configuration: built-in defaults, then an optional TOML file

mod types;

use std::net::SocketAddr;

pub use types::{Config, LoggingConfig, ServerConfig};

/// Default config file, resolved without extension
pub const DEFAULT_CONFIG_PATH: &str = "viewkit";

impl Config {
    /// Load configuration from the given file path (extension optional)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("render.template_dir", "templates")?
            .set_default("render.content_type", "text/html; charset=utf-8")?
            .set_default("render.debug", true)?
            .set_default("assets.skip_logging", false)?
            .set_default("assets.index_file", "index.html")?
            .set_default("assets.dir", "/static")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
