//! Top-level error type for the controller binary.

/// Wraps every subsystem failure that can abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Configuration loading failed.
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The agent-facing TCP listener failed to bind.
    #[error("network error: {0}")]
    Network(#[from] ranctl_net::NetworkError),

    /// The northbound HTTP API server failed to start.
    #[error("api server error: {0}")]
    Api(#[from] ranctl_api::ServerError),
}
