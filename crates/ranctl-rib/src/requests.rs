//! Requests manager (C3): thin indirection so apps send by `bs_id`
//! without knowing which agent, among possibly several per BS, covers
//! the message kind they are sending.

use ranctl_net::NetworkInterface;
use ranctl_types::{BsId, Capability, ControlMessage};

use crate::error::RibError;
use crate::rib::Rib;

/// The capability a message kind requires of its destination agent, if
/// any. Messages with no required capability (liveness probes, the
/// handshake itself) are sent to any connected agent for the BS.
pub const fn required_capability(msg: &ControlMessage) -> Option<Capability> {
    match msg {
        ControlMessage::EnbConfigRequest
        | ControlMessage::AgentReconfiguration { .. }
        | ControlMessage::UeConfigRequest
        | ControlMessage::UeConfigReply { .. } => Some(Capability::Rrc),
        ControlMessage::LcConfigRequest => Some(Capability::Rlc),
        ControlMessage::StatsRequest { .. }
        | ControlMessage::ControlDelegation { .. }
        | ControlMessage::DelegateControl { .. } => Some(Capability::HiMac),
        ControlMessage::DlMacConfig(_) => Some(Capability::LoMac),
        ControlMessage::YamlConfig { .. } => Some(Capability::Rrc),
        ControlMessage::HelloRequest
        | ControlMessage::HelloReply { .. }
        | ControlMessage::EchoRequest { .. }
        | ControlMessage::EchoReply { .. }
        | ControlMessage::SfTrigger { .. }
        | ControlMessage::EnbConfigReply { .. }
        | ControlMessage::LcConfigReply { .. }
        | ControlMessage::StatsReply { .. }
        | ControlMessage::UeStateChange { .. }
        | ControlMessage::Disconnect { .. } => None,
    }
}

/// Send `msg` to the BS identified by `bs_id`, resolving to whichever of
/// its agents covers the message's required capability.
///
/// # Errors
///
/// Returns [`RibError::NoSuchBs`] if `bs_id` is not registered,
/// [`RibError::NoCapableAgent`] if no connected agent covers the
/// message's required capability, or [`RibError::Network`] if the
/// transport itself rejects the send.
pub fn send_message(
    rib: &Rib,
    net: &NetworkInterface,
    bs_id: BsId,
    msg: ControlMessage,
) -> Result<(), RibError> {
    if !rib.has_bs(bs_id) {
        return Err(RibError::NoSuchBs(bs_id));
    }
    let required = required_capability(&msg);
    let agents = rib.agents_for_bs(bs_id);
    let target = match required {
        None => agents.first().copied(),
        Some(cap) => agents.iter().find(|(_, caps)| caps.contains(cap)).copied(),
    };
    let Some((agent_id, _)) = target else {
        return Err(RibError::NoCapableAgent(bs_id));
    };
    net.send(agent_id, msg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use ranctl_types::{BsId, Capability, ControlMessage};

    use super::{required_capability, send_message};
    use crate::rib::Rib;

    #[test]
    fn dl_mac_config_requires_lo_mac() {
        let msg = ControlMessage::DlMacConfig(ranctl_types::DlMacConfig {
            frame: 0,
            subframe: 0,
            dcis: Vec::new(),
            pdus: Vec::new(),
        });
        assert_eq!(required_capability(&msg), Some(Capability::LoMac));
    }

    #[test]
    fn echo_request_has_no_required_capability() {
        assert_eq!(required_capability(&ControlMessage::EchoRequest { token: 1 }), None);
    }

    #[tokio::test]
    async fn sending_to_unregistered_bs_fails() {
        let rib = Rib::new();
        let Ok(net) = ranctl_net::NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        let outcome = send_message(&rib, &net, BsId(1), ControlMessage::EchoRequest { token: 1 });
        assert!(matches!(outcome, Err(crate::error::RibError::NoSuchBs(BsId(1)))));
    }
}
