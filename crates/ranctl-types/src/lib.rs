//! Shared data model for the RAN controller control plane.
//!
//! This crate is the single source of truth for identifiers, enumerations,
//! configuration structs, and wire message kinds used across the
//! workspace: the RIB, the RRM app, the MAC scheduler, and the northbound
//! API all build on these types rather than redefining their own.
//!
//! # Modules
//!
//! - [`ids`] -- strongly-typed identifiers (agent, BS, RNTI, IMSI, slice)
//! - [`enums`] -- capability sets, slice algorithms, HARQ/TPC enumerations
//! - [`structs`] -- cell/slice/UE/logical-channel configuration and
//!   per-UE scheduling bookkeeping
//! - [`messages`] -- tagged control-message payloads carried over the
//!   agent wire protocol

pub mod enums;
pub mod ids;
pub mod messages;
pub mod structs;

pub use enums::{
    AccountingPolicy, Capability, CapabilitySet, HarqStatus, SliceAlgorithm, SortingPolicy,
    TpcCommand,
};
pub use ids::{AgentId, BsId, Imsi, Rnti, SliceId};
pub use messages::{ControlMessage, DlDci, DlMacConfig, RlcPdu};
pub use structs::{
    CellConfig, DlAlgoParams, DlSlice, HarqProcess, LcConfig, MacStats, NvsParams, RlcReport,
    Scn19Params, SliceConfig, StaticDlParams, StaticUlParams, StatsRequestConfig, UeConfig,
    UeSchedulingInfo, UlAlgoParams, UlSlice, HARQ_PROCESS_COUNT,
};
