//! The radio information base itself (C4): the central mutable store of
//! per-agent and per-BS state.

use std::collections::HashMap;

use ranctl_types::{
    AgentId, BsId, CapabilitySet, CellConfig, Imsi, LcConfig, MacStats, Rnti, StatsRequestConfig,
    UeConfig,
};

use crate::bs::BsRecord;
use crate::error::RibError;

/// Below this string length, a `parse_bs_id` argument is treated as a
/// short-form internal agent id rather than a full eNB id.
const AGENT_ID_LENGTH_LIMIT: usize = 4;
/// Below this string length, a `parse_rnti_imsi` argument is an RNTI
/// rather than an IMSI.
const IMSI_LENGTH_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingState {
    /// Waiting for the agent's hello reply.
    Pend,
    /// Hello received; waiting for the capability report.
    Capq,
}

#[derive(Debug, Clone)]
struct PendingAgent {
    state: PendingState,
    connected_at_ms: u64,
    bs_id: Option<BsId>,
}

#[derive(Debug, Clone, Copy)]
struct AgentRecord {
    bs_id: BsId,
    capabilities: CapabilitySet,
}

/// The central mutable store of controller-side state.
///
/// All mutation happens on the scheduler thread (see the concurrency
/// model in the top-level design notes); this type holds no internal
/// locking because nothing else is ever touching it concurrently.
#[derive(Debug, Default)]
pub struct Rib {
    pending: HashMap<AgentId, PendingAgent>,
    agents: HashMap<AgentId, AgentRecord>,
    bs: HashMap<BsId, BsRecord>,
    last_added_bs: Option<BsId>,
}

/// Outcome of [`Rib::register_capabilities`]: the BS the agent now
/// serves, and whether this was the first agent to register for it
/// (the caller should emit a `bs_add` event only in that case).
#[derive(Debug, Clone, Copy)]
pub struct Registered {
    /// The base station the agent now serves.
    pub bs_id: BsId,
    /// Whether this BS had no other agents before this call.
    pub is_new_bs: bool,
}

/// Outcome of [`Rib::remove_agent`] for an agent that had completed the
/// handshake.
#[derive(Debug, Clone, Copy)]
pub struct Removed {
    /// The base station the agent used to serve.
    pub bs_id: BsId,
    /// Whether this was the last agent serving `bs_id` (the caller
    /// should emit `bs_remove`; the BS record itself is retained so
    /// historical state survives a later reconnect).
    pub was_last_agent: bool,
}

impl Rib {
    /// Construct an empty RIB.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly-connected agent as pending a hello reply.
    pub fn add_pending_agent(&mut self, agent_id: AgentId, now_ms: u64) {
        self.pending.insert(
            agent_id,
            PendingAgent { state: PendingState::Pend, connected_at_ms: now_ms, bs_id: None },
        );
    }

    /// Record a hello reply, advancing the agent from PEND to CAPQ.
    ///
    /// # Errors
    ///
    /// Returns [`RibError::WrongHandshakeState`] if the agent is not
    /// currently pending a hello reply.
    pub fn record_hello(&mut self, agent_id: AgentId, bs_id: BsId) -> Result<(), RibError> {
        let pending = self.pending.get_mut(&agent_id).ok_or(RibError::UnknownAgent(agent_id))?;
        if pending.state != PendingState::Pend {
            return Err(RibError::WrongHandshakeState(agent_id));
        }
        pending.state = PendingState::Capq;
        pending.bs_id = Some(bs_id);
        Ok(())
    }

    /// Record a capability report, advancing the agent from CAPQ to
    /// ACTIVE and registering it against its BS.
    ///
    /// # Errors
    ///
    /// Returns [`RibError::WrongHandshakeState`] if the agent has not
    /// yet received a hello reply.
    pub fn register_capabilities(
        &mut self,
        agent_id: AgentId,
        capabilities: CapabilitySet,
        now_ms: u64,
    ) -> Result<Registered, RibError> {
        let pending = self.pending.get(&agent_id).ok_or(RibError::UnknownAgent(agent_id))?;
        if pending.state != PendingState::Capq {
            return Err(RibError::WrongHandshakeState(agent_id));
        }
        let Some(bs_id) = pending.bs_id else {
            return Err(RibError::WrongHandshakeState(agent_id));
        };
        self.pending.remove(&agent_id);

        let is_new_bs = !self.bs.contains_key(&bs_id);
        let bs = self.bs.entry(bs_id).or_insert_with(|| BsRecord::new(bs_id, now_ms));
        bs.add_agent(agent_id, capabilities);
        self.agents.insert(agent_id, AgentRecord { bs_id, capabilities });
        self.last_added_bs = Some(bs_id);
        Ok(Registered { bs_id, is_new_bs })
    }

    /// Stop tracking an agent, whether pending or active.
    ///
    /// Returns `Some` with the BS it served if it had completed the
    /// handshake; the BS record itself is retained (it may reconnect).
    pub fn remove_agent(&mut self, agent_id: AgentId) -> Option<Removed> {
        if self.pending.remove(&agent_id).is_some() {
            return None;
        }
        let record = self.agents.remove(&agent_id)?;
        let was_last_agent =
            self.bs.get_mut(&record.bs_id).is_some_and(|bs| bs.remove_agent(agent_id));
        Some(Removed { bs_id: record.bs_id, was_last_agent })
    }

    /// Whether `bs_id` has a registered record.
    pub fn has_bs(&self, bs_id: BsId) -> bool {
        self.bs.contains_key(&bs_id)
    }

    /// A read view onto one BS's state.
    pub fn get_bs(&self, bs_id: BsId) -> Option<&BsRecord> {
        self.bs.get(&bs_id)
    }

    /// All currently registered BS ids.
    pub fn available_bs(&self) -> impl Iterator<Item = BsId> + '_ {
        self.bs.keys().copied()
    }

    /// The agent serving `agent_id`'s base station and its capability
    /// set, if the agent is active.
    pub fn agent_capabilities(&self, agent_id: AgentId) -> Option<(BsId, CapabilitySet)> {
        self.agents.get(&agent_id).map(|a| (a.bs_id, a.capabilities))
    }

    /// Agents (and their capability sets) serving `bs_id`.
    pub fn agents_for_bs(&self, bs_id: BsId) -> Vec<(AgentId, CapabilitySet)> {
        let Some(bs) = self.bs.get(&bs_id) else {
            return Vec::new();
        };
        bs.agents()
            .iter()
            .filter_map(|id| self.agents.get(id).map(|a| (*id, a.capabilities)))
            .collect()
    }

    /// # Errors
    ///
    /// Returns [`RibError::NoSuchBs`] if `bs_id` is not registered.
    pub fn update_enb_config(&mut self, bs_id: BsId, cells: Vec<CellConfig>) -> Result<(), RibError> {
        self.bs_mut(bs_id)?.update_enb_config(cells);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RibError::NoSuchBs`] if `bs_id` is not registered.
    pub fn update_ue_config(&mut self, bs_id: BsId, ues: Vec<UeConfig>) -> Result<(), RibError> {
        self.bs_mut(bs_id)?.update_ue_config(ues);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RibError::NoSuchBs`] if `bs_id` is not registered.
    pub fn update_lc_config(&mut self, bs_id: BsId, lcs: Vec<LcConfig>) -> Result<(), RibError> {
        self.bs_mut(bs_id)?.update_lc_config(lcs);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RibError::NoSuchBs`] if `bs_id` is not registered.
    pub fn update_mac_stats(&mut self, bs_id: BsId, stats: Vec<MacStats>) -> Result<(), RibError> {
        self.bs_mut(bs_id)?.update_mac_stats(stats);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RibError::NoSuchBs`] if `bs_id` is not registered.
    pub fn update_subframe(&mut self, bs_id: BsId, frame: u16, subframe: u8) -> Result<(), RibError> {
        self.bs_mut(bs_id)?.update_subframe(frame, subframe);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RibError::NoSuchBs`] if `bs_id` is not registered.
    pub fn set_stats_request(
        &mut self,
        bs_id: BsId,
        config: StatsRequestConfig,
    ) -> Result<(), RibError> {
        self.bs_mut(bs_id)?.set_stats_request(config);
        Ok(())
    }

    /// Record a liveness update for `bs_id`. Returns `true` if the BS
    /// was inactive and has now recovered.
    ///
    /// # Errors
    ///
    /// Returns [`RibError::NoSuchBs`] if `bs_id` is not registered.
    pub fn update_liveness(&mut self, bs_id: BsId, now_ms: u64) -> Result<bool, RibError> {
        Ok(self.bs_mut(bs_id)?.touch_liveness(now_ms))
    }

    /// Agents still pending (no completed handshake) that connected more
    /// than `timeout_ms` ago. The caller should close these connections
    /// and call [`Rib::remove_agent`] on each.
    pub fn pending_older_than(&self, now_ms: u64, timeout_ms: u64) -> Vec<AgentId> {
        self.pending
            .iter()
            .filter(|(_, p)| now_ms.saturating_sub(p.connected_at_ms) >= timeout_ms)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Scan every registered BS for a fresh inactivity crossing, marking
    /// it and returning the ids that just crossed the threshold.
    pub fn scan_inactive(&mut self, now_ms: u64) -> Vec<BsId> {
        self.bs
            .values_mut()
            .filter(|bs| bs.check_inactive(now_ms))
            .map(BsRecord::bs_id)
            .collect()
    }

    /// Resolve a `:id` path parameter into a BS id.
    ///
    /// `-1` means "the most recently registered BS"; a numeric string
    /// shorter than [`AGENT_ID_LENGTH_LIMIT`] digits is read as an
    /// internal agent id and resolved to the BS that agent serves;
    /// longer strings (optionally `0x`-prefixed for hex) are read as the
    /// eNB id directly. Returns `None` instead of the original's `0`/
    /// `-1` sentinel, matching `Option`'s idiom for "not found".
    pub fn parse_bs_id(&self, s: &str) -> Option<BsId> {
        if s == "-1" {
            return self.last_added_bs;
        }
        if s.len() >= AGENT_ID_LENGTH_LIMIT {
            let value = if let Some(hex) = s.strip_prefix("0x") {
                u64::from_str_radix(hex, 16).ok()?
            } else {
                s.parse().ok()?
            };
            return self.has_bs(BsId(value)).then_some(BsId(value));
        }
        let agent_id: u32 = s.parse().ok()?;
        self.agents.get(&AgentId(agent_id)).map(|a| a.bs_id)
    }

    /// Resolve a `:rnti_imsi` path parameter against one BS's UE table.
    ///
    /// Strings shorter than [`IMSI_LENGTH_LIMIT`] digits are read as an
    /// RNTI directly; longer strings are read as an IMSI and resolved
    /// via the BS's UE table.
    pub fn parse_rnti_imsi(&self, bs_id: BsId, s: &str) -> Option<Rnti> {
        if s.len() < IMSI_LENGTH_LIMIT {
            let value: u16 = s.parse().ok()?;
            return Some(Rnti(value));
        }
        let imsi: u64 = s.parse().ok()?;
        self.get_bs(bs_id)?.rnti_for_imsi(Imsi(imsi))
    }

    fn bs_mut(&mut self, bs_id: BsId) -> Result<&mut BsRecord, RibError> {
        self.bs.get_mut(&bs_id).ok_or(RibError::NoSuchBs(bs_id))
    }
}

#[cfg(test)]
mod tests {
    use ranctl_types::{Capability, Imsi};

    use super::*;

    fn activate(rib: &mut Rib, agent_id: AgentId, bs_id: BsId) -> Option<Registered> {
        rib.add_pending_agent(agent_id, 0);
        rib.record_hello(agent_id, bs_id).ok()?;
        rib.register_capabilities(agent_id, CapabilitySet::from_caps([Capability::Rrc]), 0).ok()
    }

    #[test]
    fn handshake_registers_a_new_bs_exactly_once() {
        let mut rib = Rib::new();
        let Some(registered) = activate(&mut rib, AgentId(1), BsId(42)) else {
            return assert!(false, "handshake failed");
        };
        assert!(registered.is_new_bs);
        assert!(rib.has_bs(BsId(42)));
    }

    #[test]
    fn second_agent_on_same_bs_is_not_new() {
        let mut rib = Rib::new();
        assert!(activate(&mut rib, AgentId(1), BsId(42)).is_some());
        let Some(second) = activate(&mut rib, AgentId(2), BsId(42)) else {
            return assert!(false, "second handshake failed");
        };
        assert!(!second.is_new_bs);
        assert_eq!(rib.agents_for_bs(BsId(42)).len(), 2);
    }

    #[test]
    fn capability_report_before_hello_is_rejected() {
        let mut rib = Rib::new();
        rib.add_pending_agent(AgentId(1), 0);
        let outcome = rib.register_capabilities(AgentId(1), CapabilitySet::empty(), 0);
        assert!(matches!(outcome, Err(RibError::WrongHandshakeState(_))));
    }

    #[test]
    fn remove_last_agent_reports_bs_as_vacated() {
        let mut rib = Rib::new();
        assert!(activate(&mut rib, AgentId(1), BsId(42)).is_some());
        let Some(removed) = rib.remove_agent(AgentId(1)) else {
            return assert!(false, "expected Removed outcome");
        };
        assert_eq!(removed.bs_id, BsId(42));
        assert!(removed.was_last_agent);
    }

    #[test]
    fn removing_a_pending_agent_yields_no_outcome() {
        let mut rib = Rib::new();
        rib.add_pending_agent(AgentId(7), 0);
        assert!(rib.remove_agent(AgentId(7)).is_none());
    }

    #[test]
    fn parse_bs_id_resolves_last_added_and_short_agent_form() {
        let mut rib = Rib::new();
        assert!(activate(&mut rib, AgentId(1), BsId(234_881_024)).is_some());
        assert_eq!(rib.parse_bs_id("-1"), Some(BsId(234_881_024)));
        assert_eq!(rib.parse_bs_id("1"), Some(BsId(234_881_024)));
        assert_eq!(rib.parse_bs_id("234881024"), Some(BsId(234_881_024)));
        assert_eq!(rib.parse_bs_id("0xe000000"), Some(BsId(234_881_024)));
        assert_eq!(rib.parse_bs_id("999999"), None);
    }

    #[test]
    fn parse_rnti_imsi_resolves_short_form_directly() {
        let rib = Rib::new();
        assert_eq!(rib.parse_rnti_imsi(BsId(1), "10337"), Some(Rnti(10337)));
    }

    #[test]
    fn parse_rnti_imsi_resolves_imsi_through_ue_table() {
        let mut rib = Rib::new();
        assert!(activate(&mut rib, AgentId(1), BsId(42)).is_some());
        let bs_id = BsId(42);
        let ue = UeConfig {
            rnti: Rnti(10),
            imsi: Some(Imsi(208_930_000_000_123)),
            transmission_mode: 1,
            time_alignment_timer: 0,
            dl_slice_id: ranctl_types::SliceId(0),
            ul_slice_id: ranctl_types::SliceId(0),
            pcell_carrier_index: 0,
        };
        assert!(rib.update_ue_config(bs_id, vec![ue]).is_ok());
        assert_eq!(rib.parse_rnti_imsi(bs_id, "208930000000123"), Some(Rnti(10)));
    }

    #[test]
    fn inactivity_fires_once_then_recovers_on_liveness() {
        let mut rib = Rib::new();
        assert!(activate(&mut rib, AgentId(1), BsId(42)).is_some());
        assert_eq!(rib.scan_inactive(1_000_000), vec![BsId(42)]);
        assert_eq!(rib.scan_inactive(1_000_001), Vec::<BsId>::new());
        match rib.update_liveness(BsId(42), 1_000_002) {
            Ok(recovered) => assert!(recovered),
            Err(_) => assert!(false, "expected BS to be registered"),
        }
    }
}
