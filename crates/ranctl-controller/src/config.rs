//! Controller startup configuration.
//!
//! Read from `ranctl-controller.yaml` at the current working directory
//! if present; every field defaults sensibly so the controller also
//! starts cleanly with no config file at all.

use std::path::Path;

use serde::Deserialize;

/// Errors loading the controller's configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file's contents did not parse as YAML in the expected shape.
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// The downward (agent-facing) TCP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the agent-facing TCP listener binds to.
    pub bind_addr: String,
    /// Per-agent outbound send queue depth.
    pub send_queue_capacity: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { bind_addr: String::from("0.0.0.0:2210"), send_queue_capacity: 64 }
    }
}

/// The northbound HTTP API listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host address the API server binds to.
    pub host: String,
    /// TCP port the API server listens on.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let ranctl_api::ServerConfig { host, port } = ranctl_api::ServerConfig::default();
        Self { host, port }
    }
}

/// Scheduler tuning.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How many in-flight northbound commands the scheduler will queue
    /// before `SchedulerHandle::execute` itself starts to block.
    pub command_queue_depth: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { command_queue_depth: 64 }
    }
}

/// Top-level controller configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Agent-facing TCP listener settings.
    pub network: NetworkConfig,
    /// Northbound HTTP API settings.
    pub api: ApiConfig,
    /// Scheduler tuning.
    pub scheduler: SchedulerConfig,
}

impl ControllerConfig {
    /// Load configuration from `path`, or fall back to defaults if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be
    /// read, or [`ConfigError::Yaml`] if its contents do not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }
}
