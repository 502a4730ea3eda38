//! Northbound HTTP API (C10).
//!
//! Every handler does exactly one thing: resolve path/body arguments,
//! marshal a closure onto the scheduler thread via
//! [`ranctl_scheduler::SchedulerHandle::execute`], and translate the
//! result into a response. Handlers never touch the RIB, the network
//! interface, or the event bus directly -- `execute` is the single
//! synchronization boundary this crate is allowed to cross.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
