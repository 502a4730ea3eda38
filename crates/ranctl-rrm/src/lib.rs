//! RRM management (C8): slice-configuration admission, UE-to-slice
//! association, cell restart, and IMSI-based auto-association.
//!
//! # Modules
//!
//! - [`slice`] -- slice-configuration validation, migration, and the
//!   create/remove-pair shorthand
//! - [`ue_slice`] -- associating a UE with DL/UL slices
//! - [`cell`] -- cell-restart field validation and RF-parameter checks
//! - [`autoassoc`] -- IMSI-substring auto-association, wired as a
//!   per-tick app fed by the event bus
//! - [`error`] -- failure modes shared across the crate

pub mod autoassoc;
pub mod cell;
pub mod error;
pub mod slice;
pub mod ue_slice;

pub use autoassoc::{AutoAssocQueue, AutoAssocRule, AutoAssocRules, AutoAssociationApp};
pub use cell::CellRestartRequest;
pub use error::RrmError;
