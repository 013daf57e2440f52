use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_URL: &str = "http://127.0.0.1:6789/";
pub const DEFAULT_PORT: u16 = 6789;

/// Top level of the YAML configuration file.
/// Both sections are optional, a missing section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings for one run of the concurrent probe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProbeConfig {
    /// The URL every task sends its GET request to.
    #[serde(default = "default_url")]
    pub url: String,

    /// Number of concurrent requests to launch. Must be at least 1.
    #[serde(default = "default_task_count")]
    pub task_count: usize,

    /// Delay between two consecutive launches, in microseconds.
    #[serde(default = "default_launch_delay_us")]
    pub launch_delay_us: u64,

    /// Optional per-request timeout in milliseconds.
    /// Without it a hung connection blocks the probe indefinitely.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

/// Settings for the static target server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Capacity of the listen backlog handed to the kernel.
    #[serde(default = "default_backlog")]
    pub backlog: u32,

    /// Directory files are served from.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Pause before each accept, lets pending connections pile up in the backlog.
    #[serde(default)]
    pub accept_delay_ms: u64,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_task_count() -> usize {
    2
}

fn default_launch_delay_us() -> u64 {
    1000
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_backlog() -> u32 {
    1
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            url: default_url(),
            task_count: default_task_count(),
            launch_delay_us: default_launch_delay_us(),
            request_timeout_ms: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            backlog: default_backlog(),
            root: default_root(),
            accept_delay_ms: 0,
        }
    }
}

impl ProbeConfig {
    pub fn launch_delay(&self) -> Duration {
        Duration::from_micros(self.launch_delay_us)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.task_count == 0 {
            return Err(invalid("probe.task_count", "must be at least 1"));
        }
        let url = Url::parse(&self.url).map_err(|e| invalid("probe.url", &e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(
                "probe.url",
                &format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(invalid("probe.request_timeout_ms", "must be greater than 0"));
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn accept_delay(&self) -> Duration {
        Duration::from_millis(self.accept_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backlog == 0 {
            return Err(invalid("server.backlog", "must be at least 1"));
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.probe.validate()?;
        self.server.validate()
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
