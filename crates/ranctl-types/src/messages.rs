//! Control-message kinds exchanged between the controller and an agent.
//!
//! Each variant is one payload kind named in the distilled spec's
//! external-interface section. The wire framing (`uint32_be length ||
//! payload`) is implemented by `ranctl-codec`; this module only defines
//! the tagged payload shape encoded inside the frame.

use serde::{Deserialize, Serialize};

use crate::enums::CapabilitySet;
use crate::ids::{BsId, Rnti};
use crate::structs::{CellConfig, LcConfig, MacStats, StatsRequestConfig, UeConfig};

/// A downlink control information grant for one UE in one subframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlDci {
    /// Target UE.
    pub rnti: Rnti,
    /// HARQ process id this grant belongs to.
    pub harq_pid: u8,
    /// Modulation and coding scheme index.
    pub mcs: u8,
    /// RBG allocation bitmap.
    pub rb_bitmap: Vec<bool>,
    /// New-data indicator.
    pub ndi: bool,
    /// Redundancy version.
    pub rv: u8,
    /// Transmit-power-control command, 0/1/2 encoding.
    pub tpc: u8,
}

/// One RLC PDU carried in a DL MAC configuration message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlcPdu {
    /// Owning UE.
    pub rnti: Rnti,
    /// Logical channel this PDU was built from.
    pub lcid: u8,
    /// Payload size in bytes (two identical TB copies are sent on the
    /// wire; this records the size of one).
    pub size_bytes: u32,
}

/// Outbound per-subframe MAC configuration: DCIs plus their RLC payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlMacConfig {
    /// Target radio frame.
    pub frame: u16,
    /// Target subframe, 0-9.
    pub subframe: u8,
    /// Grants issued this subframe.
    pub dcis: Vec<DlDci>,
    /// RLC PDUs backing the grants above.
    pub pdus: Vec<RlcPdu>,
}

/// Tagged control-message payload exchanged with one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ControlMessage {
    /// Sent by the controller immediately after accepting a connection.
    HelloRequest,
    /// Sent by an agent in response to `HelloRequest`, reporting its
    /// `bs_id` and capabilities.
    HelloReply {
        /// Reported base-station id.
        bs_id: BsId,
        /// Reported capability set.
        capabilities: CapabilitySet,
    },
    /// Liveness probe, either direction.
    EchoRequest {
        /// Opaque token echoed back unchanged.
        token: u64,
    },
    /// Reply to `EchoRequest`.
    EchoReply {
        /// Token copied from the corresponding request.
        token: u64,
    },
    /// Per-subframe liveness/timing beacon from an agent.
    SfTrigger {
        /// Current radio frame at the agent.
        frame: u16,
        /// Current subframe at the agent.
        subframe: u8,
    },
    /// Request for the agent's current cell configuration.
    EnbConfigRequest,
    /// Agent's cell-configuration report.
    EnbConfigReply {
        /// Cell configurations, one per carrier.
        cells: Vec<CellConfig>,
    },
    /// Request for the agent's current UE configurations.
    UeConfigRequest,
    /// Agent's UE-configuration report.
    UeConfigReply {
        /// Reported UE configurations.
        ues: Vec<UeConfig>,
    },
    /// Request for the agent's current logical-channel configurations.
    LcConfigRequest,
    /// Agent's logical-channel-configuration report.
    LcConfigReply {
        /// Reported logical-channel configurations.
        lcs: Vec<LcConfig>,
    },
    /// Subscribe the agent to a statistics-reporting schedule.
    StatsRequest {
        /// Requested reporting schedule.
        config: StatsRequestConfig,
    },
    /// Agent's periodic statistics report.
    StatsReply {
        /// Reported per-UE MAC statistics.
        stats: Vec<MacStats>,
    },
    /// Unsolicited notification that a UE's state changed (e.g. a new
    /// RNTI was assigned, or the UE detached).
    UeStateChange {
        /// UE whose state changed.
        rnti: Rnti,
        /// Whether the UE is now active on the cell.
        active: bool,
    },
    /// Push new cell configuration to the agent (used by RRM).
    AgentReconfiguration {
        /// Partial cell configuration to apply.
        cell: CellConfig,
    },
    /// Delegate scheduling control to this controller (remote scheduler).
    ControlDelegation {
        /// Whether central (remote) scheduling should be active.
        enable_remote_scheduling: bool,
    },
    /// Push an opaque named blob (a fetched application image, a
    /// scheduling policy) for the agent to load. The controller never
    /// interprets `payload`; it only relays whatever a loader app fetched.
    DelegateControl {
        /// Identifier the agent stores the blob under.
        name: String,
        /// Raw blob contents.
        payload: Vec<u8>,
    },
    /// Per-subframe scheduling decision pushed to the agent.
    DlMacConfig(DlMacConfig),
    /// Raw YAML configuration forwarded to the agent verbatim, bypassing
    /// the typed reconfiguration path. Internal-test compatibility only;
    /// the controller does not parse or validate the payload.
    YamlConfig {
        /// Raw YAML document, unparsed.
        yaml: String,
    },
    /// Either side requests the connection be torn down.
    Disconnect {
        /// Human-readable reason.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_message_roundtrips_through_json() {
        let msg = ControlMessage::SfTrigger { frame: 12, subframe: 3 };
        let json = serde_json::to_string(&msg).unwrap_or_default();
        let back: ControlMessage = serde_json::from_str(&json).unwrap_or(ControlMessage::HelloRequest);
        assert_eq!(back, msg);
    }

    #[test]
    fn hello_reply_carries_capabilities() {
        let msg = ControlMessage::HelloReply {
            bs_id: BsId(234_881_024),
            capabilities: CapabilitySet::from_caps([crate::enums::Capability::Rrc]),
        };
        let ControlMessage::HelloReply { bs_id, capabilities } = msg else {
            return assert!(false, "wrong variant");
        };
        assert_eq!(bs_id, BsId(234_881_024));
        assert!(capabilities.contains(crate::enums::Capability::Rrc));
    }
}
