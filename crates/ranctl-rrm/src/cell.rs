//! Cell reconfiguration (restart).
//!
//! The agent-side cell-restart operation only accepts a small set of RF
//! parameters; every other field the original system's configuration
//! message could carry is rejected outright, with a message naming the
//! field. `check_eutra_band`/`check_eutra_bandwidth` validate that the
//! accepted combination is physically sane; their source tables were not
//! present in the pack this implementation was built from, so the bands
//! and bandwidths below are this implementation's own documented choice
//! (a handful of common bands), not a literal carry-over.

use ranctl_net::NetworkInterface;
use ranctl_rib::{Rib, RibError};
use ranctl_types::{BsId, CellConfig, ControlMessage};
use serde::Deserialize;

use crate::error::RrmError;

/// A cell-restart request. Fields outside the accepted set are still
/// accepted by the wire format (as `Option<serde_json::Value>`) purely
/// so their presence can be detected and rejected with a specific
/// message, mirroring the original system's per-field `has_x()` checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRestartRequest {
    /// LTE E-UTRA band. Required.
    pub eutra_band: Option<u8>,
    /// DL carrier frequency, MHz. Required.
    pub dl_freq: Option<u32>,
    /// UL carrier frequency, MHz. Required.
    pub ul_freq: Option<u32>,
    /// DL bandwidth, in RBs. Required, must equal `ul_bandwidth`.
    pub dl_bandwidth: Option<u8>,
    /// UL bandwidth, in RBs. Required, must equal `dl_bandwidth`.
    pub ul_bandwidth: Option<u8>,
    /// Not settable on restart; present only so it can be rejected.
    pub phy_cell_id: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub pusch_hopping_offset: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub hopping_mode: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub n_sb: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub phich_resource: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub phich_duration: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub init_nr_pdcch_ofdm_sym: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub si_config: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub ul_cyclic_prefix_length: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub dl_cyclic_prefix_length: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub antenna_ports_count: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub duplex_mode: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub subframe_assignment: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub special_subframe_patterns: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub mbsfn_subframe_config_rfperiod: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub mbsfn_subframe_config_rfoffset: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub mbsfn_subframe_config_sfalloc: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub prach_config_index: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub prach_freq_offset: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub ra_response_window_size: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub mac_contention_resolution_timer: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub max_harq_msg3_tx: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub n1_pucch_an: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub deltapucch_shift: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub nrb_cqi: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub srs_subframe_config: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub srs_bw_config: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub srs_mac_up_pts: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub enable64_qam: Option<serde_json::Value>,
    /// Not settable on restart; present only so it can be rejected.
    pub plmn_id: Option<serde_json::Value>,
    /// Not settable here; use the slice-configuration endpoints instead.
    pub carrier_index: Option<serde_json::Value>,
    /// Not settable here; use the slice-configuration endpoints instead.
    pub slice_config: Option<serde_json::Value>,
}

fn verify_restart_request(req: &CellRestartRequest) -> Result<(), RrmError> {
    let rejected: &[(bool, &str)] = &[
        (req.phy_cell_id.is_some(), "phy_cell_id"),
        (req.pusch_hopping_offset.is_some(), "pusch_hopping_offset"),
        (req.hopping_mode.is_some(), "hopping_mode"),
        (req.n_sb.is_some(), "n_sb"),
        (req.phich_resource.is_some(), "phich_resource"),
        (req.phich_duration.is_some(), "phich_duration"),
        (req.init_nr_pdcch_ofdm_sym.is_some(), "init_nr_pdcch_ofdm_sym"),
        (req.si_config.is_some(), "si_config"),
        (req.ul_cyclic_prefix_length.is_some(), "ul_cyclic_prefix_length"),
        (req.dl_cyclic_prefix_length.is_some(), "dl_cyclic_prefix_length"),
        (req.antenna_ports_count.is_some(), "antenna_ports_count"),
        (req.duplex_mode.is_some(), "duplex_mode"),
        (req.subframe_assignment.is_some(), "subframe_assignment"),
        (req.special_subframe_patterns.is_some(), "special_subframe_patterns"),
        (req.mbsfn_subframe_config_rfperiod.is_some(), "mbsfn_subframe_config_rfperiod"),
        (req.mbsfn_subframe_config_rfoffset.is_some(), "mbsfn_subframe_config_rfoffset"),
        (req.mbsfn_subframe_config_sfalloc.is_some(), "mbsfn_subframe_config_sfalloc"),
        (req.prach_config_index.is_some(), "prach_config_index"),
        (req.prach_freq_offset.is_some(), "prach_freq_offset"),
        (req.ra_response_window_size.is_some(), "ra_response_window_size"),
        (req.mac_contention_resolution_timer.is_some(), "mac_contention_resolution_timer"),
        (req.max_harq_msg3_tx.is_some(), "max_harq_msg3tx"),
        (req.n1_pucch_an.is_some(), "n1pucch_an"),
        (req.deltapucch_shift.is_some(), "deltapucch_shift"),
        (req.nrb_cqi.is_some(), "nrb_cqi"),
        (req.srs_subframe_config.is_some(), "srs_subframe_config"),
        (req.srs_bw_config.is_some(), "srs_bw_config"),
        (req.srs_mac_up_pts.is_some(), "srs_mac_up_pts"),
        (req.enable64_qam.is_some(), "enable_64qam"),
        (req.plmn_id.is_some(), "plmn_id"),
    ];
    for (present, label) in rejected {
        if *present {
            return Err(RrmError::InvalidArgument(format!("setting {label} not supported")));
        }
    }
    if req.carrier_index.is_some() {
        return Err(RrmError::InvalidArgument(
            "setting not supported yet, defaults to 0".to_string(),
        ));
    }
    if req.slice_config.is_some() {
        return Err(RrmError::InvalidArgument(
            "setting slice_config not supported, use another end point".to_string(),
        ));
    }
    Ok(())
}

const VALID_BANDWIDTHS: [u8; 5] = [6, 15, 25, 50, 100];

fn check_eutra_bandwidth(bandwidth_rb: u8) -> Result<(), RrmError> {
    if VALID_BANDWIDTHS.contains(&bandwidth_rb) {
        Ok(())
    } else {
        Err(RrmError::InvalidArgument(format!("unsupported cell bandwidth: {bandwidth_rb} RB")))
    }
}

struct BandPlan {
    band: u8,
    ul_mhz: (u32, u32),
    dl_mhz: (u32, u32),
}

const BAND_PLANS: &[BandPlan] = &[
    BandPlan { band: 1, ul_mhz: (1920, 1980), dl_mhz: (2110, 2170) },
    BandPlan { band: 3, ul_mhz: (1710, 1785), dl_mhz: (1805, 1880) },
    BandPlan { band: 7, ul_mhz: (2500, 2570), dl_mhz: (2620, 2690) },
    BandPlan { band: 20, ul_mhz: (832, 862), dl_mhz: (791, 821) },
    BandPlan { band: 38, ul_mhz: (2570, 2620), dl_mhz: (2570, 2620) },
];

fn check_eutra_band(band: u8, dl_freq_mhz: u32, ul_freq_mhz: u32) -> Result<(), RrmError> {
    let Some(plan) = BAND_PLANS.iter().find(|p| p.band == band) else {
        return Err(RrmError::InvalidArgument(format!("unsupported eutra band: {band}")));
    };
    let dl_in_range = (plan.dl_mhz.0..=plan.dl_mhz.1).contains(&dl_freq_mhz);
    let ul_in_range = (plan.ul_mhz.0..=plan.ul_mhz.1).contains(&ul_freq_mhz);
    if dl_in_range && ul_in_range {
        Ok(())
    } else {
        Err(RrmError::InvalidArgument(format!(
            "dl_freq/ul_freq do not fall within eutra band {band}'s plan"
        )))
    }
}

/// Apply a cell restart: validate `req`, push the accepted RF parameters
/// to the agent, and write them back into the RIB.
///
/// # Errors
///
/// Returns [`RrmError::InvalidArgument`] for any rejected or missing
/// field, or [`RrmError::NoSuchCell`]/a RIB error if `bs_id`/`cell_id`
/// do not resolve.
pub fn restart(
    rib: &mut Rib,
    net: &NetworkInterface,
    bs_id: BsId,
    cell_id: u16,
    req: &CellRestartRequest,
) -> Result<(), RrmError> {
    verify_restart_request(req)?;

    let Some(eutra_band) = req.eutra_band else {
        return Err(RrmError::InvalidArgument("eutra_band is required".to_string()));
    };
    let (Some(dl_freq), Some(ul_freq)) = (req.dl_freq, req.ul_freq) else {
        return Err(RrmError::InvalidArgument("dl_freq and ul_freq are required".to_string()));
    };
    let (Some(dl_bandwidth), Some(ul_bandwidth)) = (req.dl_bandwidth, req.ul_bandwidth) else {
        return Err(RrmError::InvalidArgument(
            "dl_bandwidth and ul_bandwidth are required".to_string(),
        ));
    };
    if dl_bandwidth != ul_bandwidth {
        return Err(RrmError::InvalidArgument(
            "dl_bandwidth and ul_bandwidth must match".to_string(),
        ));
    }
    check_eutra_bandwidth(dl_bandwidth)?;
    check_eutra_band(eutra_band, dl_freq, ul_freq)?;

    let mut cells = {
        let bs = rib.get_bs(bs_id).ok_or(RibError::NoSuchBs(bs_id))?;
        if !bs.cells().iter().any(|c| c.cell_id == cell_id) {
            return Err(RrmError::NoSuchCell(bs_id, cell_id));
        }
        bs.cells().to_vec()
    };
    let Some(cell) = cells.iter_mut().find(|c| c.cell_id == cell_id) else {
        return Err(RrmError::NoSuchCell(bs_id, cell_id));
    };
    cell.eutra_band = eutra_band;
    cell.dl_freq = dl_freq;
    cell.ul_freq = ul_freq;
    cell.dl_bandwidth = dl_bandwidth;
    cell.ul_bandwidth = ul_bandwidth;
    let updated: CellConfig = cell.clone();

    ranctl_rib::send_message(
        rib,
        net,
        bs_id,
        ControlMessage::AgentReconfiguration { cell: updated },
    )?;
    rib.update_enb_config(bs_id, cells)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_phy_cell_id_with_original_message() {
        let req = CellRestartRequest {
            phy_cell_id: Some(serde_json::json!(5)),
            ..CellRestartRequest::default()
        };
        let err = verify_restart_request(&req).unwrap_err();
        assert_eq!(err.to_string(), "setting phy_cell_id not supported");
    }

    #[test]
    fn rejects_slice_config_with_pointer_to_other_endpoint() {
        let req = CellRestartRequest {
            slice_config: Some(serde_json::json!({})),
            ..CellRestartRequest::default()
        };
        let err = verify_restart_request(&req).unwrap_err();
        assert_eq!(err.to_string(), "setting slice_config not supported, use another end point");
    }

    #[test]
    fn band_7_accepts_its_real_plan() {
        assert!(check_eutra_band(7, 2650, 2530).is_ok());
    }

    #[test]
    fn band_7_rejects_mismatched_frequency() {
        assert!(check_eutra_band(7, 1000, 1000).is_err());
    }

    #[test]
    fn bandwidth_must_be_one_of_the_known_values() {
        assert!(check_eutra_bandwidth(50).is_ok());
        assert!(check_eutra_bandwidth(13).is_err());
    }
}
