//! Per-base-station record held by the RIB.

use std::collections::HashMap;

use ranctl_types::{
    AgentId, BsId, CapabilitySet, CellConfig, Imsi, LcConfig, MacStats, Rnti, StatsRequestConfig,
    UeConfig,
};

/// Threshold, in milliseconds, of no liveness update before a BS is
/// considered inactive.
pub const INACTIVITY_THRESHOLD_MS: u64 = 1500;

/// All controller-side state for one base station.
#[derive(Debug, Clone)]
pub struct BsRecord {
    bs_id: BsId,
    agents: Vec<AgentId>,
    capabilities: CapabilitySet,
    cells: Vec<CellConfig>,
    ues: HashMap<Rnti, UeConfig>,
    imsi_index: HashMap<Imsi, Rnti>,
    lcs: HashMap<Rnti, Vec<LcConfig>>,
    mac_stats: HashMap<Rnti, MacStats>,
    stats_request: StatsRequestConfig,
    current_frame: u16,
    current_subframe: u8,
    last_active_ms: u64,
    inactive: bool,
}

impl BsRecord {
    pub(crate) fn new(bs_id: BsId, now_ms: u64) -> Self {
        Self {
            bs_id,
            agents: Vec::new(),
            capabilities: CapabilitySet::empty(),
            cells: Vec::new(),
            ues: HashMap::new(),
            imsi_index: HashMap::new(),
            lcs: HashMap::new(),
            mac_stats: HashMap::new(),
            stats_request: StatsRequestConfig::default(),
            current_frame: 0,
            current_subframe: 0,
            last_active_ms: now_ms,
            inactive: false,
        }
    }

    /// This BS's identifier.
    pub const fn bs_id(&self) -> BsId {
        self.bs_id
    }

    /// Agents currently serving this BS.
    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    /// Union of capabilities across all agents serving this BS.
    pub const fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    /// Reported cell configurations, one per carrier.
    pub fn cells(&self) -> &[CellConfig] {
        &self.cells
    }

    /// One UE's current configuration, if known.
    pub fn ue(&self, rnti: Rnti) -> Option<&UeConfig> {
        self.ues.get(&rnti)
    }

    /// All known UE configurations.
    pub fn ues(&self) -> impl Iterator<Item = &UeConfig> {
        self.ues.values()
    }

    /// Resolve an IMSI to its current RNTI, if the UE is known.
    pub fn rnti_for_imsi(&self, imsi: Imsi) -> Option<Rnti> {
        self.imsi_index.get(&imsi).copied()
    }

    /// Logical channels configured for one UE.
    pub fn lcs_for(&self, rnti: Rnti) -> &[LcConfig] {
        self.lcs.get(&rnti).map_or(&[], Vec::as_slice)
    }

    /// Most recent MAC statistics for one UE.
    pub fn mac_stats_for(&self, rnti: Rnti) -> Option<&MacStats> {
        self.mac_stats.get(&rnti)
    }

    /// All known MAC statistics.
    pub fn all_mac_stats(&self) -> impl Iterator<Item = &MacStats> {
        self.mac_stats.values()
    }

    /// Current stats-reporting subscription.
    pub const fn stats_request(&self) -> StatsRequestConfig {
        self.stats_request
    }

    /// Most recently reported (frame, subframe) pair.
    pub const fn current_subframe(&self) -> (u16, u8) {
        (self.current_frame, self.current_subframe)
    }

    /// Whether this BS is currently flagged inactive.
    pub const fn is_inactive(&self) -> bool {
        self.inactive
    }

    pub(crate) fn add_agent(&mut self, agent_id: AgentId, capabilities: CapabilitySet) {
        self.agents.push(agent_id);
        self.capabilities.merge(capabilities);
    }

    /// Remove an agent. Returns `true` if this BS now has no agents left.
    pub(crate) fn remove_agent(&mut self, agent_id: AgentId) -> bool {
        self.agents.retain(|id| *id != agent_id);
        self.agents.is_empty()
    }

    pub(crate) fn update_enb_config(&mut self, cells: Vec<CellConfig>) {
        self.cells = cells;
    }

    /// Overwrite this BS's full UE configuration set, enforcing that a
    /// UE's IMSI is immutable once set: if the incoming report carries a
    /// different IMSI for an already-known RNTI, the existing IMSI wins.
    pub(crate) fn update_ue_config(&mut self, ues: Vec<UeConfig>) {
        for mut ue in ues {
            if let Some(existing) = self.ues.get(&ue.rnti) {
                if let Some(existing_imsi) = existing.imsi {
                    if ue.imsi != Some(existing_imsi) {
                        tracing::warn!(
                            rnti = %ue.rnti,
                            "ignoring IMSI change on already-bound UE"
                        );
                        ue.imsi = Some(existing_imsi);
                    }
                }
            }
            if let Some(imsi) = ue.imsi {
                self.imsi_index.insert(imsi, ue.rnti);
            }
            self.ues.insert(ue.rnti, ue);
        }
    }

    pub(crate) fn update_lc_config(&mut self, lcs: Vec<LcConfig>) {
        let mut by_rnti: HashMap<Rnti, Vec<LcConfig>> = HashMap::new();
        for lc in lcs {
            by_rnti.entry(lc.rnti).or_default().push(lc);
        }
        for (rnti, lcs) in by_rnti {
            self.lcs.insert(rnti, lcs);
        }
    }

    pub(crate) fn update_mac_stats(&mut self, stats: Vec<MacStats>) {
        for stat in stats {
            self.mac_stats.insert(stat.rnti, stat);
        }
    }

    pub(crate) fn update_subframe(&mut self, frame: u16, subframe: u8) {
        self.current_frame = frame;
        self.current_subframe = subframe;
    }

    pub(crate) fn set_stats_request(&mut self, config: StatsRequestConfig) {
        self.stats_request = config;
    }

    /// Record a liveness update. Returns `true` if this BS was inactive
    /// and is now recovering (the caller should emit a recovery event).
    pub(crate) fn touch_liveness(&mut self, now_ms: u64) -> bool {
        self.last_active_ms = now_ms;
        if self.inactive {
            self.inactive = false;
            return true;
        }
        false
    }

    /// Returns `true` the first time `now_ms` crosses the inactivity
    /// threshold since `last_active_ms` (subsequent calls while still
    /// inactive return `false`, satisfying "fires exactly once per
    /// inactive episode").
    pub(crate) fn check_inactive(&mut self, now_ms: u64) -> bool {
        if self.inactive {
            return false;
        }
        if now_ms.saturating_sub(self.last_active_ms) >= INACTIVITY_THRESHOLD_MS {
            self.inactive = true;
            return true;
        }
        false
    }
}
