//! Handlers, split by the resource they act on.
//!
//! Every handler follows the same shape: resolve path/body arguments,
//! run exactly one closure through [`ranctl_scheduler::SchedulerHandle::execute`],
//! and translate its result into a response. `:id?`-style optional path
//! segments from the external interface are modeled as two routes
//! sharing one private `*_core` function, the explicit-id route simply
//! supplying the literal default the bare route omits.

pub mod autoassoc;
pub mod cell;
pub mod slice;
pub mod stats;
pub mod ue_slice;
pub mod yaml;

mod common;
