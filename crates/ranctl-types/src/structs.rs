//! Core entity structs: cell/slice/UE/logical-channel configuration, MAC
//! statistics, and per-UE scheduling bookkeeping.

use serde::{Deserialize, Serialize};

use crate::enums::{AccountingPolicy, HarqStatus, SliceAlgorithm, SortingPolicy};
use crate::ids::{Rnti, SliceId};

/// Static-algorithm frequency-plane position for a DL slice, in RBGs.
/// `position_low <= position_high`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDlParams {
    /// Lower RBG bound, inclusive.
    #[serde(rename = "poslow")]
    pub position_low: u8,
    /// Upper RBG bound, inclusive.
    #[serde(rename = "poshigh")]
    pub position_high: u8,
}

/// Static-algorithm frequency-plane position for a UL slice, in RBs.
/// Shares the same `{poslow, poshigh}` wire shape as the DL variant --
/// the source's `flex_slice` carries one `static_` message reused for
/// both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticUlParams {
    /// Lower RB bound, inclusive.
    #[serde(rename = "poslow")]
    pub position_low: u8,
    /// Upper RB bound, inclusive.
    #[serde(rename = "poshigh")]
    pub position_high: u8,
}

/// NVS-algorithm reservation for a slice: either a fixed percentage or a
/// rate ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NvsParams {
    /// Reserved percentage of the cell bandwidth, if fixed-share.
    #[serde(default)]
    pub pct_reserved: Option<u8>,
    /// Required throughput in kbps, if rate-ratio based.
    #[serde(default)]
    pub kbps_required: Option<u32>,
    /// Reference throughput in kbps, if rate-ratio based.
    #[serde(default)]
    pub kbps_reference: Option<u32>,
}

/// SCN19-algorithm variant for a slice. Exactly one variant applies.
///
/// The distilled spec leaves SCN19 semantics beyond the None->SCN19
/// identity transform as an open question (see DESIGN.md); these field
/// shapes are this implementation's resolution, not a literal carry-over
/// from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scn19Params {
    /// Elastic allocation between a floor and a ceiling share of PRBs.
    Dynamic {
        /// Minimum guaranteed PRBs.
        min_prb: u8,
        /// Maximum PRBs this slice may claim.
        max_prb: u8,
    },
    /// A fixed PRB weight, identical in spirit to a static reservation.
    Fixed {
        /// Weight used when distributing PRBs among fixed slices.
        weight: u8,
    },
    /// Allocation granted only once demand crosses a throughput threshold.
    OnDemand {
        /// Demand threshold, in kbps, above which PRBs are granted.
        threshold_kbps: u32,
    },
}

/// Algorithm-specific parameters a DL slice may carry. At most one is
/// set, matching the BS-wide `algorithm` field. Flattened into the
/// enclosing [`DlSlice`] on the wire, so the active variant appears as
/// a top-level `static`/`nvs`/`scn19` key next to `id`/`label`/etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlAlgoParams {
    /// Parameters under the Static algorithm.
    #[serde(rename = "static", default)]
    pub static_params: Option<StaticDlParams>,
    /// Parameters under the NVS algorithm.
    #[serde(default)]
    pub nvs: Option<NvsParams>,
    /// Parameters under the SCN19 algorithm.
    #[serde(default)]
    pub scn19: Option<Scn19Params>,
}

/// Algorithm-specific parameters a UL slice may carry. See [`DlAlgoParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UlAlgoParams {
    /// Parameters under the Static algorithm.
    #[serde(rename = "static", default)]
    pub static_params: Option<StaticUlParams>,
    /// Parameters under the NVS algorithm.
    #[serde(default)]
    pub nvs: Option<NvsParams>,
    /// Parameters under the SCN19 algorithm.
    #[serde(default)]
    pub scn19: Option<Scn19Params>,
}

/// One downlink slice definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlSlice {
    /// Slice identifier, unique among DL slices on this BS.
    pub id: SliceId,
    /// Free-form label; currently cosmetic.
    #[serde(default)]
    pub label: Option<String>,
    /// Share of DL bandwidth this slice may use, 1-100.
    #[serde(default)]
    pub percentage: Option<u8>,
    /// Whether unused RBs are withheld from other slices.
    #[serde(default)]
    pub isolation: Option<bool>,
    /// Priority used during inter-slice multiplexing, 0-20.
    #[serde(default)]
    pub priority: Option<u8>,
    /// Algorithm-specific parameters.
    #[serde(flatten)]
    pub params: DlAlgoParams,
    /// Maximum MCS this slice's UEs may be scheduled at, 0-28.
    #[serde(default)]
    pub maxmcs: Option<u8>,
    /// UE sort order used before accounting.
    #[serde(default)]
    pub sorting: Option<Vec<SortingPolicy>>,
    /// Accounting policy.
    #[serde(default)]
    pub accounting: Option<AccountingPolicy>,
    /// Loaded scheduler name; informational only.
    #[serde(default)]
    pub scheduler_name: Option<String>,
}

/// One uplink slice definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UlSlice {
    /// Slice identifier, unique among UL slices on this BS.
    pub id: SliceId,
    /// Free-form label; currently cosmetic.
    #[serde(default)]
    pub label: Option<String>,
    /// Share of UL bandwidth this slice may use, 1-100.
    #[serde(default)]
    pub percentage: Option<u8>,
    /// Whether unused RBs are withheld from other slices.
    #[serde(default)]
    pub isolation: Option<bool>,
    /// Priority used during inter-slice multiplexing, 0-20.
    #[serde(default)]
    pub priority: Option<u8>,
    /// Algorithm-specific parameters.
    #[serde(flatten)]
    pub params: UlAlgoParams,
    /// Maximum MCS this slice's UEs may be scheduled at, 0-20.
    #[serde(default)]
    pub maxmcs: Option<u8>,
    /// Accounting policy.
    #[serde(default)]
    pub accounting: Option<AccountingPolicy>,
    /// Loaded scheduler name; informational only.
    #[serde(default)]
    pub scheduler_name: Option<String>,
}

/// Full slice configuration for one BS.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceConfig {
    /// Active slicing algorithm.
    #[serde(default)]
    pub algorithm: SliceAlgorithm,
    /// Downlink slices, always containing at least slice 0.
    #[serde(default)]
    pub dl: Vec<DlSlice>,
    /// Uplink slices, always containing at least slice 0.
    #[serde(default)]
    pub ul: Vec<UlSlice>,
    /// Whether intra-slice sharing is active.
    #[serde(default)]
    pub intraslice_share_active: Option<bool>,
    /// Whether inter-slice multiplexing is active.
    #[serde(default)]
    pub interslice_share_active: Option<bool>,
}

impl SliceConfig {
    /// Find a DL slice by id.
    pub fn dl_slice(&self, id: SliceId) -> Option<&DlSlice> {
        self.dl.iter().find(|s| s.id == id)
    }

    /// Find a UL slice by id.
    pub fn ul_slice(&self, id: SliceId) -> Option<&UlSlice> {
        self.ul.iter().find(|s| s.id == id)
    }
}

/// Static cell configuration reported by an agent and, selectively,
/// reconfigurable by the northbound API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellConfig {
    /// Physical cell id.
    pub phy_cell_id: u16,
    /// Controller-internal cell index within the BS.
    pub cell_id: u16,
    /// DL bandwidth, in resource blocks (one of 6/15/25/50/100).
    pub dl_bandwidth: u8,
    /// UL bandwidth, in resource blocks (one of 6/15/25/50/100).
    pub ul_bandwidth: u8,
    /// DL carrier frequency, in MHz.
    pub dl_freq: u32,
    /// UL carrier frequency, in MHz.
    pub ul_freq: u32,
    /// LTE E-UTRA band number.
    pub eutra_band: u8,
    /// DL PDSCH reference power, in dBm.
    pub dl_pdsch_power: i32,
    /// UL PUSCH reference power, in dBm.
    pub ul_pusch_power: i32,
    /// Slice configuration for this cell.
    pub slice_config: SliceConfig,
    /// Remaining agent-reported fields this controller does not interpret,
    /// preserved verbatim for stats snapshots.
    #[serde(default)]
    pub raw_extra: serde_json::Value,
}

impl CellConfig {
    /// Number of RBGs for this cell's DL bandwidth (2/3/4 RBs per RBG
    /// depending on bandwidth, per 3GPP TS 36.213).
    pub const fn rbg_count(bandwidth_rb: u8) -> u8 {
        match bandwidth_rb {
            6 => 6,
            15 => 8,
            25 => 13,
            50 => 17,
            100 => 25,
            _ => 0,
        }
    }

    /// RBG size (in RBs) for this cell's DL bandwidth.
    pub const fn rbg_size(bandwidth_rb: u8) -> u8 {
        match bandwidth_rb {
            6 | 15 => 2,
            25 => 2,
            50 => 3,
            100 => 4,
            _ => 1,
        }
    }
}

/// Per-UE static configuration (transmission parameters and slice
/// association), keyed by RNTI within a BS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeConfig {
    /// Radio-network temporary identifier.
    pub rnti: Rnti,
    /// Stable subscriber identifier, if known. Immutable once set.
    pub imsi: Option<crate::ids::Imsi>,
    /// 3GPP transmission mode index.
    pub transmission_mode: u8,
    /// Time-alignment timer value.
    pub time_alignment_timer: u16,
    /// Current DL slice association.
    pub dl_slice_id: SliceId,
    /// Current UL slice association.
    pub ul_slice_id: SliceId,
    /// Primary cell carrier index.
    pub pcell_carrier_index: u8,
}

/// One logical-channel configuration entry for a UE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcConfig {
    /// Owning UE.
    pub rnti: Rnti,
    /// Logical-channel id.
    pub lcid: u8,
    /// Scheduling priority, lower is higher priority.
    pub priority: Option<u8>,
}

/// RLC buffer-status report for one logical channel, as consumed by the
/// MAC scheduler when building a new transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlcReport {
    /// Logical-channel id this report describes.
    pub lcid: u8,
    /// Bytes queued for transmission.
    pub tx_queue_size: u32,
    /// Head-of-line delay, in ms.
    pub head_of_line_delay_ms: u32,
}

/// Most recent MAC-layer statistics for one UE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacStats {
    /// UE this snapshot describes.
    pub rnti: Rnti,
    /// Buffer status report levels, one per logical-channel group.
    pub bsr: Vec<u32>,
    /// Power headroom report, in dB, if reported.
    pub phr: Option<i16>,
    /// DL channel-quality indicator.
    pub dl_cqi: Option<u8>,
    /// UL channel-quality indicator.
    pub ul_cqi: Option<u8>,
    /// Cumulative PDCP bytes transmitted.
    pub pdcp_tx_bytes: u64,
    /// Cumulative PDCP bytes received.
    pub pdcp_rx_bytes: u64,
    /// Cumulative MAC bytes transmitted.
    pub mac_tx_bytes: u64,
    /// Cumulative MAC bytes received.
    pub mac_rx_bytes: u64,
    /// Per-logical-channel RLC buffer reports, used by the scheduler.
    pub rlc_reports: Vec<RlcReport>,
}

impl MacStats {
    /// An empty stats snapshot for a freshly-registered UE.
    pub fn empty(rnti: Rnti) -> Self {
        Self {
            rnti,
            bsr: Vec::new(),
            phr: None,
            dl_cqi: None,
            ul_cqi: None,
            pdcp_tx_bytes: 0,
            pdcp_rx_bytes: 0,
            mac_tx_bytes: 0,
            mac_rx_bytes: 0,
            rlc_reports: Vec::new(),
        }
    }
}

/// State of one HARQ process for one UE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarqProcess {
    /// Outcome of the previous transmission on this process.
    pub status: HarqStatus,
    /// MCS used for the in-flight (or last) transmission.
    pub mcs: u8,
    /// Number of RBs allocated to the in-flight (or last) transmission.
    pub nb_rb: u8,
    /// New-data indicator, toggled on every new transmission.
    pub ndi: bool,
    /// RBG allocation bitmap committed for this process, indexed by RBG.
    pub rballoc_sub: Vec<bool>,
}

impl HarqProcess {
    /// A process with no outstanding transmission.
    pub fn idle(n_rbg: usize) -> Self {
        Self {
            status: HarqStatus::None,
            mcs: 0,
            nb_rb: 0,
            ndi: false,
            rballoc_sub: vec![false; n_rbg],
        }
    }
}

/// Number of parallel HARQ processes per UE (FDD).
pub const HARQ_PROCESS_COUNT: usize = 8;

/// Per-UE scheduling bookkeeping maintained by the MAC scheduler across
/// ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeSchedulingInfo {
    /// UE this record describes.
    pub rnti: Rnti,
    /// HARQ processes, indexed by process id 0..8.
    pub harq: Vec<HarqProcess>,
    /// RBs the DL preprocessor made available to this UE this tick.
    pub pre_nb_rbs_available: u16,
    /// RBG bitmap the preprocessor pre-allocated to this UE this tick.
    pub rballoc_sub_preproc: Vec<bool>,
    /// Timing-advance timer; 0 means a TA command element is pending.
    pub ta_timer: u8,
    /// Frame in which the PUCCH TPC command was last updated.
    pub last_tpc_frame: u16,
    /// Subframe in which the PUCCH TPC command was last updated.
    pub last_tpc_subframe: u8,
}

impl UeSchedulingInfo {
    /// A freshly-registered UE with no scheduling history.
    pub fn new(rnti: Rnti, n_rbg: usize) -> Self {
        Self {
            rnti,
            harq: (0..HARQ_PROCESS_COUNT).map(|_| HarqProcess::idle(n_rbg)).collect(),
            pre_nb_rbs_available: 0,
            rballoc_sub_preproc: vec![false; n_rbg],
            ta_timer: 0,
            last_tpc_frame: 0,
            last_tpc_subframe: 0,
        }
    }
}

/// A stats subscription requested by an operator for one BS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRequestConfig {
    /// Reporting period, in radio frames.
    pub period_frames: u16,
    /// Whether per-cell configuration reports are requested.
    pub cell_reports: bool,
    /// Whether per-UE statistics reports are requested.
    pub ue_reports: bool,
}

impl Default for StatsRequestConfig {
    fn default() -> Self {
        Self { period_frames: 10, cell_reports: true, ue_reports: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rbg_count_matches_known_bandwidths() {
        assert_eq!(CellConfig::rbg_count(25), 13);
        assert_eq!(CellConfig::rbg_count(50), 17);
    }

    #[test]
    fn slice_config_finds_by_id() {
        let mut cfg = SliceConfig::default();
        cfg.dl.push(DlSlice {
            id: SliceId(3),
            label: None,
            percentage: Some(25),
            isolation: None,
            priority: None,
            params: DlAlgoParams::default(),
            maxmcs: Some(26),
            sorting: None,
            accounting: None,
            scheduler_name: None,
        });
        assert!(cfg.dl_slice(SliceId(3)).is_some());
        assert!(cfg.dl_slice(SliceId(4)).is_none());
    }

    #[test]
    fn harq_process_idle_has_no_status() {
        let p = HarqProcess::idle(13);
        assert_eq!(p.status, HarqStatus::None);
        assert_eq!(p.rballoc_sub.len(), 13);
    }

    #[test]
    fn ue_scheduling_info_has_all_harq_processes() {
        let info = UeSchedulingInfo::new(Rnti(1), 13);
        assert_eq!(info.harq.len(), HARQ_PROCESS_COUNT);
    }
}
