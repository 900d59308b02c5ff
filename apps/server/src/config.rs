//! Server configuration
//!
//! Values are layered, later sources winning:
//! 1. built-in defaults
//! 2. `config.toml` in the working directory (or the file given with `--config`)
//! 3. environment variables prefixed `LAB_`, sections separated by `__`,
//!    e.g. `LAB_SERVER__PORT=8080` or `LAB_REFERENCE__PATH=/data/metrics.csv`
//!
//! A `.env` file is loaded into the environment first, if present.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "LAB";
const DEFAULT_CONFIG_FILE: &str = "config";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub reference: ReferenceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. `*` allows any origin; empty disables CORS headers.
    pub cors_origins: Vec<String>,
    pub max_request_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
            max_request_body_size: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Reference table CSV.
    pub path: PathBuf,
    /// Load the table at startup instead of on the first upload.
    pub preload: bool,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/diagnostic_metrics.csv"),
            preload: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// One of `daily`, `hourly`, `minutely`, `never`.
    pub file_rotation: String,
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "lab-server".to_string(),
            file_rotation: "daily".to_string(),
            service_name: "lab-server".to_string(),
        }
    }
}

const FILE_ROTATIONS: &[&str] = &["daily", "hourly", "minutely", "never"];

impl Config {
    /// Load configuration from `config.toml` (optional) and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `file` instead of the default `config.toml`.
    ///
    /// An explicitly given file must exist.
    pub fn load_from(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();

        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be non-zero".to_string());
        }
        if self.server.max_request_body_size == 0 {
            return Err("server.max_request_body_size must be non-zero".to_string());
        }
        if self.reference.path.as_os_str().is_empty() {
            return Err("reference.path must be set".to_string());
        }
        if self.logging.file_enabled
            && !FILE_ROTATIONS.contains(&self.logging.file_rotation.as_str())
        {
            return Err(format!(
                "logging.file_rotation must be one of {}, got '{}'",
                FILE_ROTATIONS.join(", "),
                self.logging.file_rotation
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address '{addr}': {e}"))
    }
}
