//! RIB updater (C5): drains transport events into [`Rib`] mutations,
//! drives the handshake, and turns the outcome into bus-facing events
//! for the scheduler to publish.
//!
//! Deliberately has no dependency on `ranctl-events`: the updater only
//! reports what happened, leaving the decision of how (and whether) to
//! publish it on the event bus to the caller that owns both.

use std::collections::VecDeque;

use ranctl_net::{NetworkEvent, NetworkInterface};
use ranctl_types::{AgentId, BsId, ControlMessage, Rnti};

use crate::rib::Rib;

/// Default cap on messages drained per tick, bounding how much work one
/// tick can push onto the scheduler regardless of inbound burst size.
pub const DEFAULT_MESSAGE_BUDGET: usize = 350;

/// Time a newly-connected agent is given to complete the handshake
/// before the updater closes it.
pub const HANDSHAKE_TIMEOUT_MS: u64 = 5_000;

/// Something the updater wants published on the event bus. Carries no
/// subscriber-facing behavior of its own, just the fact and its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RibEvent {
    /// A BS gained its first agent (or recovered from inactivity).
    BsAdd(BsId),
    /// A BS lost its last agent.
    BsRemove(BsId),
    /// A UE became active on a cell.
    UeConnect(BsId, Rnti),
    /// A UE's configuration changed while already connected.
    UeUpdate(BsId, Rnti),
    /// A UE detached or was reported inactive.
    UeDisconnect(BsId, Rnti),
}

/// Buffers transport events and feeds them through the handshake and
/// routing logic a bounded number at a time per tick.
#[derive(Debug, Default)]
pub struct RibUpdater {
    queue: VecDeque<NetworkEvent>,
}

impl RibUpdater {
    /// Construct an updater with an empty backlog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append events drained from [`NetworkInterface::poll`] to the
    /// backlog, preserving arrival order.
    pub fn push_events(&mut self, events: impl IntoIterator<Item = NetworkEvent>) {
        self.queue.extend(events);
    }

    /// How many events are still waiting to be processed.
    pub fn backlog_len(&self) -> usize {
        self.queue.len()
    }

    /// Process up to `budget` queued events against `rib`, sending any
    /// handshake or liveness replies through `net`, and return the bus
    /// events the caller should publish. Events beyond `budget` stay
    /// queued for the next tick, in order.
    pub fn drain(
        &mut self,
        rib: &mut Rib,
        net: &NetworkInterface,
        now_ms: u64,
        budget: usize,
    ) -> Vec<RibEvent> {
        let mut out = Vec::new();
        for _ in 0..budget {
            let Some(event) = self.queue.pop_front() else {
                break;
            };
            handle_event(rib, net, now_ms, event, &mut out);
        }
        out
    }

    /// Close any connection still pending its handshake past
    /// [`HANDSHAKE_TIMEOUT_MS`].
    pub fn enforce_handshake_timeout(&self, rib: &mut Rib, net: &mut NetworkInterface, now_ms: u64) {
        for agent_id in rib.pending_older_than(now_ms, HANDSHAKE_TIMEOUT_MS) {
            tracing::warn!(%agent_id, "handshake timed out, closing connection");
            net.disconnect(agent_id);
            rib.remove_agent(agent_id);
        }
    }
}

fn handle_event(
    rib: &mut Rib,
    net: &NetworkInterface,
    now_ms: u64,
    event: NetworkEvent,
    out: &mut Vec<RibEvent>,
) {
    match event {
        NetworkEvent::Connected(agent_id) => {
            rib.add_pending_agent(agent_id, now_ms);
            if let Err(e) = net.send(agent_id, ControlMessage::HelloRequest) {
                tracing::warn!(%agent_id, error = %e, "failed to send hello request");
            }
        }
        NetworkEvent::Disconnected(agent_id, reason) => {
            tracing::info!(%agent_id, %reason, "agent disconnected");
            if let Some(removed) = rib.remove_agent(agent_id) {
                if removed.was_last_agent {
                    out.push(RibEvent::BsRemove(removed.bs_id));
                }
            }
        }
        NetworkEvent::Received(agent_id, msg) => {
            handle_received(rib, net, now_ms, agent_id, msg, out);
        }
    }
}

fn handle_received(
    rib: &mut Rib,
    net: &NetworkInterface,
    now_ms: u64,
    agent_id: AgentId,
    msg: ControlMessage,
    out: &mut Vec<RibEvent>,
) {
    if let Some((bs_id, _)) = rib.agent_capabilities(agent_id) {
        handle_active(rib, net, now_ms, agent_id, bs_id, msg, out);
        return;
    }
    handle_pending(rib, now_ms, agent_id, msg, out);
}

/// Hello replies already carry the agent's capability set, so a single
/// message completes both the CAPQ-bound hello acknowledgement and the
/// capability registration; there is no separate wire round trip for
/// the capability report.
fn handle_pending(
    rib: &mut Rib,
    now_ms: u64,
    agent_id: AgentId,
    msg: ControlMessage,
    out: &mut Vec<RibEvent>,
) {
    let ControlMessage::HelloReply { bs_id, capabilities } = msg else {
        tracing::warn!(%agent_id, "unexpected message before handshake completed");
        return;
    };
    if let Err(e) = rib.record_hello(agent_id, bs_id) {
        tracing::warn!(%agent_id, error = %e, "hello rejected");
        return;
    }
    match rib.register_capabilities(agent_id, capabilities, now_ms) {
        Ok(registered) => {
            if registered.is_new_bs {
                out.push(RibEvent::BsAdd(bs_id));
            }
        }
        Err(e) => tracing::warn!(%agent_id, error = %e, "capability registration rejected"),
    }
}

fn handle_active(
    rib: &mut Rib,
    net: &NetworkInterface,
    now_ms: u64,
    agent_id: AgentId,
    bs_id: BsId,
    msg: ControlMessage,
    out: &mut Vec<RibEvent>,
) {
    match msg {
        ControlMessage::SfTrigger { frame, subframe } => {
            let _ = rib.update_subframe(bs_id, frame, subframe);
            touch_liveness(rib, bs_id, now_ms, out);
        }
        ControlMessage::EnbConfigReply { cells } => {
            let _ = rib.update_enb_config(bs_id, cells);
            touch_liveness(rib, bs_id, now_ms, out);
        }
        ControlMessage::UeConfigReply { ues } => {
            let _ = rib.update_ue_config(bs_id, ues);
            touch_liveness(rib, bs_id, now_ms, out);
        }
        ControlMessage::LcConfigReply { lcs } => {
            let _ = rib.update_lc_config(bs_id, lcs);
            touch_liveness(rib, bs_id, now_ms, out);
        }
        ControlMessage::StatsReply { stats } => {
            let _ = rib.update_mac_stats(bs_id, stats);
            touch_liveness(rib, bs_id, now_ms, out);
        }
        ControlMessage::UeStateChange { rnti, active } => {
            touch_liveness(rib, bs_id, now_ms, out);
            if active {
                out.push(RibEvent::UeConnect(bs_id, rnti));
            } else {
                out.push(RibEvent::UeDisconnect(bs_id, rnti));
            }
        }
        ControlMessage::EchoRequest { token } => {
            if let Err(e) = net.send(agent_id, ControlMessage::EchoReply { token }) {
                tracing::warn!(%agent_id, error = %e, "failed to send echo reply");
            }
        }
        ControlMessage::Disconnect { reason } => {
            tracing::info!(%agent_id, %reason, "agent requested disconnect");
            if let Some(removed) = rib.remove_agent(agent_id) {
                if removed.was_last_agent {
                    out.push(RibEvent::BsRemove(removed.bs_id));
                }
            }
        }
        other => {
            tracing::warn!(%agent_id, message = ?other, "unexpected message kind while active");
        }
    }
}

fn touch_liveness(rib: &mut Rib, bs_id: BsId, now_ms: u64, out: &mut Vec<RibEvent>) {
    match rib.update_liveness(bs_id, now_ms) {
        Ok(true) => out.push(RibEvent::BsAdd(bs_id)),
        Ok(false) | Err(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use ranctl_types::{Capability, CapabilitySet};

    use super::{RibEvent, RibUpdater, DEFAULT_MESSAGE_BUDGET};
    use crate::rib::Rib;

    async fn bound_net() -> Option<ranctl_net::NetworkInterface> {
        ranctl_net::NetworkInterface::bind("127.0.0.1:0", 8).await.ok()
    }

    #[tokio::test]
    async fn connect_and_hello_reply_registers_a_new_bs() {
        let mut rib = Rib::new();
        let Some(net) = bound_net().await else {
            return assert!(false, "bind failed");
        };
        let mut updater = RibUpdater::new();

        updater.push_events([ranctl_net::NetworkEvent::Connected(ranctl_types::AgentId(1))]);
        let events = updater.drain(&mut rib, &net, 0, DEFAULT_MESSAGE_BUDGET);
        assert!(events.is_empty());

        updater.push_events([ranctl_net::NetworkEvent::Received(
            ranctl_types::AgentId(1),
            ranctl_types::ControlMessage::HelloReply {
                bs_id: ranctl_types::BsId(42),
                capabilities: CapabilitySet::from_caps([Capability::Rrc]),
            },
        )]);
        let events = updater.drain(&mut rib, &net, 10, DEFAULT_MESSAGE_BUDGET);
        assert_eq!(events, vec![RibEvent::BsAdd(ranctl_types::BsId(42))]);
        assert!(rib.has_bs(ranctl_types::BsId(42)));
    }

    #[tokio::test]
    async fn disconnect_of_last_agent_emits_bs_remove() {
        let mut rib = Rib::new();
        let Some(net) = bound_net().await else {
            return assert!(false, "bind failed");
        };
        let mut updater = RibUpdater::new();

        updater.push_events([
            ranctl_net::NetworkEvent::Connected(ranctl_types::AgentId(1)),
            ranctl_net::NetworkEvent::Received(
                ranctl_types::AgentId(1),
                ranctl_types::ControlMessage::HelloReply {
                    bs_id: ranctl_types::BsId(7),
                    capabilities: CapabilitySet::from_caps([Capability::Rrc]),
                },
            ),
        ]);
        let _ = updater.drain(&mut rib, &net, 0, DEFAULT_MESSAGE_BUDGET);

        updater.push_events([ranctl_net::NetworkEvent::Disconnected(
            ranctl_types::AgentId(1),
            "read error".to_owned(),
        )]);
        let events = updater.drain(&mut rib, &net, 1, DEFAULT_MESSAGE_BUDGET);
        assert_eq!(events, vec![RibEvent::BsRemove(ranctl_types::BsId(7))]);
    }

    #[tokio::test]
    async fn ue_state_change_emits_connect_event() {
        let mut rib = Rib::new();
        let Some(net) = bound_net().await else {
            return assert!(false, "bind failed");
        };
        let mut updater = RibUpdater::new();

        updater.push_events([
            ranctl_net::NetworkEvent::Connected(ranctl_types::AgentId(1)),
            ranctl_net::NetworkEvent::Received(
                ranctl_types::AgentId(1),
                ranctl_types::ControlMessage::HelloReply {
                    bs_id: ranctl_types::BsId(7),
                    capabilities: CapabilitySet::from_caps([Capability::Rrc]),
                },
            ),
        ]);
        let _ = updater.drain(&mut rib, &net, 0, DEFAULT_MESSAGE_BUDGET);

        updater.push_events([ranctl_net::NetworkEvent::Received(
            ranctl_types::AgentId(1),
            ranctl_types::ControlMessage::UeStateChange { rnti: ranctl_types::Rnti(5), active: true },
        )]);
        let events = updater.drain(&mut rib, &net, 1, DEFAULT_MESSAGE_BUDGET);
        assert_eq!(events, vec![RibEvent::UeConnect(ranctl_types::BsId(7), ranctl_types::Rnti(5))]);
    }

    #[tokio::test]
    async fn budget_defers_excess_events_to_next_drain() {
        let mut rib = Rib::new();
        let Some(net) = bound_net().await else {
            return assert!(false, "bind failed");
        };
        let mut updater = RibUpdater::new();

        updater.push_events([
            ranctl_net::NetworkEvent::Connected(ranctl_types::AgentId(1)),
            ranctl_net::NetworkEvent::Connected(ranctl_types::AgentId(2)),
            ranctl_net::NetworkEvent::Connected(ranctl_types::AgentId(3)),
        ]);
        let _ = updater.drain(&mut rib, &net, 0, 1);
        assert_eq!(updater.backlog_len(), 2);
        let _ = updater.drain(&mut rib, &net, 0, usize::from(u8::MAX));
        assert_eq!(updater.backlog_len(), 0);
    }
}
