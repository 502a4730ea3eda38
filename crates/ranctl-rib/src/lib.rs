//! Radio information base: per-BS/per-agent state, the handshake state
//! machine, and capability-routed message dispatch.
//!
//! # Modules
//!
//! - [`rib`] -- the central mutable store ([`rib::Rib`]) and handshake
//!   state transitions
//! - [`bs`] -- per-base-station record held inside the RIB
//! - [`requests`] -- resolving a `bs_id` to the agent that should
//!   receive a given message kind
//! - [`updater`] -- draining transport events into RIB mutations and
//!   bus-facing events
//! - [`error`] -- failure modes shared across the crate

pub mod bs;
pub mod error;
pub mod requests;
pub mod rib;
pub mod updater;

pub use bs::BsRecord;
pub use error::RibError;
pub use rib::{Registered, Removed, Rib};
pub use requests::{required_capability, send_message};
pub use updater::{RibEvent, RibUpdater, DEFAULT_MESSAGE_BUDGET, HANDSHAKE_TIMEOUT_MS};
