//! Server settings.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults;
//! 2. an optional `gateway.{toml,yaml,json}` file, or the path given in
//!    `GATEWAY_CONFIG`;
//! 3. environment variables shaped like `GATEWAY__SERVER__PORT=9000`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Environment variable naming the settings file.
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "gateway";

/// Deployment mode. `Dev` disables access control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    Dev,
    #[default]
    Release,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub mode: ServerMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Deadline for every store call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Complete server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    /// Baseline whitelist per API group, used to seed and reconcile the store.
    #[serde(default)]
    pub ip_whitelist: HashMap<String, Vec<String>>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_ms() -> u64 {
    3000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mode: ServerMode::default(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            store: StoreSettings::default(),
            ip_whitelist: HashMap::new(),
        }
    }
}

impl Settings {
    /// Loads settings from the default file location and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Loads settings from `path` (extension optional) and the environment.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.mode", "release")?
            .set_default("store.timeout_ms", default_timeout_ms() as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store.timeout_ms)
    }

    pub fn is_dev(&self) -> bool {
        self.server.mode == ServerMode::Dev
    }
}
