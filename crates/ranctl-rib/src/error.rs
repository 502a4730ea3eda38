//! Error types for RIB operations.

use ranctl_types::{AgentId, BsId};

/// Failure modes surfaced by [`crate::rib::Rib`] and [`crate::requests`].
#[derive(Debug, thiserror::Error)]
pub enum RibError {
    /// No base station is registered under this id.
    #[error("no such base station: {0}")]
    NoSuchBs(BsId),
    /// The agent is not currently tracked (neither pending nor active).
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),
    /// The agent exists but is not in the handshake state this call
    /// requires (e.g. a capability report arrived before a hello reply).
    #[error("agent {0} is not in the expected handshake state")]
    WrongHandshakeState(AgentId),
    /// No connected agent on this BS covers the capability a message
    /// kind requires.
    #[error("no agent on base station {0} has the required capability")]
    NoCapableAgent(BsId),
    /// The transport rejected the send (backpressure, or the agent
    /// disconnected between capability lookup and send).
    #[error(transparent)]
    Network(#[from] ranctl_net::NetworkError),
}
