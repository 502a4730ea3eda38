//! UE-to-slice association.
//!
//! Pushes a `UeConfigReply` to the owning agent (the same control
//! message the agent uses to report its UE configurations, reused here
//! as the reconfigure-agent direction, matching the source's
//! `push_ue_config_reconfiguration`), then writes the accepted
//! association back into the RIB.

use ranctl_net::NetworkInterface;
use ranctl_rib::{Rib, RibError};
use ranctl_types::{BsId, ControlMessage, Rnti, SliceId};

use crate::error::RrmError;

/// Associate a UE with DL and/or UL slices. Either direction may be left
/// unset to leave that association unchanged.
///
/// # Errors
///
/// Returns [`RrmError::NoSuchSlice`] if a referenced slice id is not
/// part of the BS's current slice configuration, or an error from the
/// underlying RIB lookup.
pub fn associate(
    rib: &mut Rib,
    net: &NetworkInterface,
    bs_id: BsId,
    rnti: Rnti,
    dl_slice_id: Option<SliceId>,
    ul_slice_id: Option<SliceId>,
) -> Result<(), RrmError> {
    let bs = rib.get_bs(bs_id).ok_or(RibError::NoSuchBs(bs_id))?;
    let Some(mut ue) = bs.ue(rnti).copied() else {
        return Err(RrmError::InvalidArgument(format!(
            "unknown UE {rnti} on base station {bs_id}"
        )));
    };
    let slice_config = bs.cells().first().map(|c| c.slice_config.clone()).unwrap_or_default();

    if let Some(id) = dl_slice_id {
        if slice_config.dl_slice(id).is_none() {
            return Err(RrmError::NoSuchSlice(id));
        }
        ue.dl_slice_id = id;
    }
    if let Some(id) = ul_slice_id {
        if slice_config.ul_slice(id).is_none() {
            return Err(RrmError::NoSuchSlice(id));
        }
        ue.ul_slice_id = id;
    }

    ranctl_rib::send_message(rib, net, bs_id, ControlMessage::UeConfigReply { ues: vec![ue] })?;
    rib.update_ue_config(bs_id, vec![ue])?;
    Ok(())
}

/// Shorthand form: pin both directions to the same slice id.
///
/// # Errors
///
/// See [`associate`].
pub fn associate_short(
    rib: &mut Rib,
    net: &NetworkInterface,
    bs_id: BsId,
    rnti: Rnti,
    slice_id: SliceId,
) -> Result<(), RrmError> {
    associate(rib, net, bs_id, rnti, Some(slice_id), Some(slice_id))
}

#[cfg(test)]
mod tests {
    use ranctl_types::{CellConfig, DlAlgoParams, DlSlice, SliceConfig, UeConfig, UlAlgoParams, UlSlice};

    use super::*;

    fn bs_with_slice_one(rib: &mut Rib, bs_id: BsId) {
        rib.add_pending_agent(ranctl_types::AgentId(1), 0);
        let _ = rib.record_hello(ranctl_types::AgentId(1), bs_id);
        let _ = rib.register_capabilities(
            ranctl_types::AgentId(1),
            ranctl_types::CapabilitySet::from_caps([ranctl_types::Capability::Rrc]),
            0,
        );
        let mut cfg = SliceConfig::default();
        let slice = |id| DlSlice {
            id,
            label: Some("t".to_string()),
            percentage: None,
            isolation: None,
            priority: None,
            params: DlAlgoParams::default(),
            maxmcs: None,
            sorting: None,
            accounting: None,
            scheduler_name: None,
        };
        cfg.dl.push(slice(SliceId(0)));
        cfg.dl.push(slice(SliceId(1)));
        cfg.ul.push(UlSlice {
            id: SliceId(0),
            label: None,
            percentage: None,
            isolation: None,
            priority: None,
            params: UlAlgoParams::default(),
            maxmcs: None,
            accounting: None,
            scheduler_name: None,
        });
        let _ = rib.update_enb_config(
            bs_id,
            vec![CellConfig {
                phy_cell_id: 1,
                cell_id: 0,
                dl_bandwidth: 50,
                ul_bandwidth: 50,
                dl_freq: 2650,
                ul_freq: 2530,
                eutra_band: 7,
                dl_pdsch_power: 0,
                ul_pusch_power: 0,
                slice_config: cfg,
                raw_extra: serde_json::Value::Null,
            }],
        );
        let _ = rib.update_ue_config(
            bs_id,
            vec![UeConfig {
                rnti: Rnti(10),
                imsi: None,
                transmission_mode: 1,
                time_alignment_timer: 0,
                dl_slice_id: SliceId(0),
                ul_slice_id: SliceId(0),
                pcell_carrier_index: 0,
            }],
        );
    }

    #[tokio::test]
    async fn associate_moves_ue_to_existing_slice() {
        let mut rib = Rib::new();
        let bs_id = BsId(1);
        bs_with_slice_one(&mut rib, bs_id);
        let Ok(net) = NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        assert!(associate(&mut rib, &net, bs_id, Rnti(10), Some(SliceId(1)), None).is_ok());
        let Some(ue) = rib.get_bs(bs_id).and_then(|bs| bs.ue(Rnti(10))) else {
            return assert!(false, "ue missing");
        };
        assert_eq!(ue.dl_slice_id, SliceId(1));
        assert_eq!(ue.ul_slice_id, SliceId(0));
    }

    #[tokio::test]
    async fn associate_rejects_unknown_slice() {
        let mut rib = Rib::new();
        let bs_id = BsId(1);
        bs_with_slice_one(&mut rib, bs_id);
        let Ok(net) = NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        let err = associate(&mut rib, &net, bs_id, Rnti(10), Some(SliceId(9)), None);
        assert!(matches!(err, Err(RrmError::NoSuchSlice(SliceId(9)))));
    }
}
