//! Slice-configuration admission: validates a proposed [`SliceConfig`]
//! against the algorithm it declares, pushes it to the owning agent, and
//! writes the accepted configuration back into the RIB.

use ranctl_net::NetworkInterface;
use ranctl_rib::{Rib, RibError};
use ranctl_types::{
    BsId, CellConfig, ControlMessage, DlSlice, SliceAlgorithm, SliceConfig, SliceId, UeConfig,
    UlSlice,
};

use crate::error::RrmError;

/// Guess the algorithm a slice list was written for from which
/// per-slice parameter variant is populated. Lets a request omit the
/// top-level `algorithm` field and still be recognized by the params it
/// actually carries, rather than falling through to the none algorithm's
/// "slice 0 only" validation.
fn infer_algorithm(dl: &[DlSlice], ul: &[UlSlice]) -> Option<SliceAlgorithm> {
    if dl.iter().any(|s| s.params.static_params.is_some())
        || ul.iter().any(|s| s.params.static_params.is_some())
    {
        return Some(SliceAlgorithm::Static);
    }
    if dl.iter().any(|s| s.params.nvs.is_some()) || ul.iter().any(|s| s.params.nvs.is_some()) {
        return Some(SliceAlgorithm::Nvs);
    }
    if dl.iter().any(|s| s.params.scn19.is_some()) || ul.iter().any(|s| s.params.scn19.is_some()) {
        return Some(SliceAlgorithm::Scn19);
    }
    None
}

/// Fill `new`'s `algorithm` when the caller omitted it: first by
/// inference from the params its slices carry, then, for a genuinely
/// empty update, from the cell's current algorithm.
fn fill_algorithm(new: &mut SliceConfig, current: &SliceConfig) {
    if new.algorithm != SliceAlgorithm::None {
        return;
    }
    if let Some(inferred) = infer_algorithm(&new.dl, &new.ul) {
        new.algorithm = inferred;
    } else if new.dl.is_empty() && new.ul.is_empty() {
        new.algorithm = current.algorithm;
    }
}

/// Overlay `incoming` onto `current` by slice id: a slice id already
/// present is replaced in place, a new one is appended. Slices the
/// caller didn't mention are left untouched, so a request naming only
/// the slice it wants to add or change does not drop the rest of the
/// BS's slice table, and the static-slice overlap check below sees the
/// full picture rather than just the slices named in this request.
fn merge_by_id<S: Clone>(incoming: Vec<S>, current: &[S], id_of: impl Fn(&S) -> SliceId) -> Vec<S> {
    let mut merged = current.to_vec();
    for slice in incoming {
        let id = id_of(&slice);
        if let Some(slot) = merged.iter_mut().find(|s| id_of(s) == id) {
            *slot = slice;
        } else {
            merged.push(slice);
        }
    }
    merged
}

/// Apply `new` to `bs_id`/`cell_id`'s slice configuration: fill its
/// algorithm and merge its slices onto the current configuration by id,
/// then hand the merged result to [`replace_slice_config`]. This is the
/// entry point for a raw, possibly-partial request naming only the
/// slices it wants to add or change.
///
/// # Errors
///
/// See [`RrmError`] variants for the specific rejection reasons.
pub fn apply_slice_config(
    rib: &mut Rib,
    net: &NetworkInterface,
    bs_id: BsId,
    cell_id: u16,
    mut new: SliceConfig,
) -> Result<(), RrmError> {
    let current = current_slice_config(rib, bs_id, cell_id)?;
    fill_algorithm(&mut new, &current);
    new.dl = merge_by_id(new.dl, &current.dl, |s| s.id);
    new.ul = merge_by_id(new.ul, &current.ul, |s| s.id);
    replace_slice_config(rib, net, bs_id, cell_id, new)
}

/// Replace `bs_id`/`cell_id`'s slice configuration outright with `new`:
/// validate it for the algorithm it declares, and, on an algorithm
/// change, check that a migration path from the current algorithm is
/// defined. A request that would change nothing succeeds as a no-op
/// without re-sending to the agent. Unlike [`apply_slice_config`], `new`
/// is taken as the complete desired slice list for each direction, so a
/// caller that wants to drop a slice can do so by building `new` without
/// it.
///
/// # Errors
///
/// See [`RrmError`] variants for the specific rejection reasons.
pub fn replace_slice_config(
    rib: &mut Rib,
    net: &NetworkInterface,
    bs_id: BsId,
    cell_id: u16,
    new: SliceConfig,
) -> Result<(), RrmError> {
    let (current_cell, mut cells) = {
        let bs = rib.get_bs(bs_id).ok_or(RibError::NoSuchBs(bs_id))?;
        let Some(current_cell) = bs.cells().iter().find(|c| c.cell_id == cell_id).cloned() else {
            return Err(RrmError::NoSuchCell(bs_id, cell_id));
        };
        (current_cell, bs.cells().to_vec())
    };

    if new == current_cell.slice_config {
        return Ok(());
    }

    let from_algo = current_cell.slice_config.algorithm;
    if from_algo != new.algorithm && !migration_supported(from_algo, new.algorithm) {
        return Err(RrmError::UnsupportedTransform { from: from_algo, to: new.algorithm });
    }

    match new.algorithm {
        SliceAlgorithm::None => validate_none(&new)?,
        SliceAlgorithm::Static => {
            validate_static(&new)?;
            detect_dl_overlap(&new.dl, CellConfig::rbg_count(current_cell.dl_bandwidth))?;
        }
        SliceAlgorithm::Nvs => validate_nvs(&new)?,
        SliceAlgorithm::Scn19 => validate_scn19(&new)?,
    }

    let mut updated_cell = current_cell;
    updated_cell.slice_config = new.clone();

    ranctl_rib::send_message(
        rib,
        net,
        bs_id,
        ControlMessage::AgentReconfiguration { cell: updated_cell.clone() },
    )?;

    if let Some(slot) = cells.iter_mut().find(|c| c.cell_id == cell_id) {
        *slot = updated_cell;
    }
    rib.update_enb_config(bs_id, cells)?;

    if from_algo != new.algorithm {
        repin_ues_to_default(rib, net, bs_id, &new)?;
    }
    Ok(())
}

/// Create a slice pair (one DL, one UL) by copying slice 0's parameters,
/// then apply the resulting configuration.
///
/// # Errors
///
/// Returns [`RrmError::InvalidArgument`] if `slice_id` already exists or
/// the BS has no slice 0 to copy from, or any error `replace_slice_config`
/// itself can return.
pub fn create_slice(
    rib: &mut Rib,
    net: &NetworkInterface,
    bs_id: BsId,
    cell_id: u16,
    slice_id: SliceId,
) -> Result<(), RrmError> {
    let current = current_slice_config(rib, bs_id, cell_id)?;
    if current.dl_slice(slice_id).is_some() || current.ul_slice(slice_id).is_some() {
        return Err(RrmError::InvalidArgument(format!("slice {slice_id} already exists")));
    }
    let Some(template_dl) = current.dl_slice(SliceId(0)).cloned() else {
        return Err(RrmError::InvalidArgument("base station has no slice 0 to copy".to_string()));
    };
    let Some(template_ul) = current.ul_slice(SliceId(0)).cloned() else {
        return Err(RrmError::InvalidArgument("base station has no slice 0 to copy".to_string()));
    };
    let mut new = current;
    new.dl.push(DlSlice { id: slice_id, ..template_dl });
    new.ul.push(UlSlice { id: slice_id, ..template_ul });
    replace_slice_config(rib, net, bs_id, cell_id, new)
}

/// Remove a slice pair. Slice 0 can never be removed.
///
/// # Errors
///
/// Returns [`RrmError::InvalidArgument`] for `slice_id == SliceId(0)`, or
/// any error `replace_slice_config` itself can return.
pub fn remove_slice(
    rib: &mut Rib,
    net: &NetworkInterface,
    bs_id: BsId,
    cell_id: u16,
    slice_id: SliceId,
) -> Result<(), RrmError> {
    if slice_id == SliceId(0) {
        return Err(RrmError::InvalidArgument("slice 0 cannot be removed".to_string()));
    }
    let mut new = current_slice_config(rib, bs_id, cell_id)?;
    new.dl.retain(|s| s.id != slice_id);
    new.ul.retain(|s| s.id != slice_id);
    replace_slice_config(rib, net, bs_id, cell_id, new)
}

fn current_slice_config(rib: &Rib, bs_id: BsId, cell_id: u16) -> Result<SliceConfig, RrmError> {
    let bs = rib.get_bs(bs_id).ok_or(RibError::NoSuchBs(bs_id))?;
    bs.cells()
        .iter()
        .find(|c| c.cell_id == cell_id)
        .map(|c| c.slice_config.clone())
        .ok_or(RrmError::NoSuchCell(bs_id, cell_id))
}

/// Re-pin every UE whose current slice id no longer exists in `new` back
/// to slice 0, then push the change to the agent as a `UeConfigReply`
/// (the same message the agent uses to report its UE configs, reused
/// here to push the reconfiguration down, matching the source's
/// `push_ue_config_reconfiguration`).
fn repin_ues_to_default(
    rib: &mut Rib,
    net: &NetworkInterface,
    bs_id: BsId,
    new: &SliceConfig,
) -> Result<(), RrmError> {
    let updated: Vec<UeConfig> = {
        let Some(bs) = rib.get_bs(bs_id) else { return Ok(()) };
        bs.ues()
            .filter_map(|ue| {
                let mut ue = *ue;
                let mut changed = false;
                if new.dl_slice(ue.dl_slice_id).is_none() {
                    ue.dl_slice_id = SliceId(0);
                    changed = true;
                }
                if new.ul_slice(ue.ul_slice_id).is_none() {
                    ue.ul_slice_id = SliceId(0);
                    changed = true;
                }
                changed.then_some(ue)
            })
            .collect()
    };
    if updated.is_empty() {
        return Ok(());
    }
    ranctl_rib::send_message(rib, net, bs_id, ControlMessage::UeConfigReply { ues: updated.clone() })?;
    rib.update_ue_config(bs_id, updated)?;
    Ok(())
}

fn migration_supported(from: SliceAlgorithm, to: SliceAlgorithm) -> bool {
    if from == to {
        return true;
    }
    matches!(
        (from, to),
        (SliceAlgorithm::None, SliceAlgorithm::Static)
            | (SliceAlgorithm::Static, SliceAlgorithm::None)
            | (SliceAlgorithm::None, SliceAlgorithm::Nvs)
            | (SliceAlgorithm::Nvs, SliceAlgorithm::None)
            | (SliceAlgorithm::None, SliceAlgorithm::Scn19)
            | (SliceAlgorithm::Scn19, SliceAlgorithm::None)
    )
}

fn validate_none(new: &SliceConfig) -> Result<(), RrmError> {
    let dl_ok = new.dl.iter().all(|s| s.id == SliceId(0));
    let ul_ok = new.ul.iter().all(|s| s.id == SliceId(0));
    if dl_ok && ul_ok {
        Ok(())
    } else {
        Err(RrmError::InvalidArgument("the none algorithm accepts only slice 0".to_string()))
    }
}

fn validate_static(new: &SliceConfig) -> Result<(), RrmError> {
    if new.dl.iter().any(|s| s.scheduler_name.is_some())
        || new.ul.iter().any(|s| s.scheduler_name.is_some())
    {
        return Err(RrmError::InvalidArgument("cannot have a single scheduler".to_string()));
    }
    let dl_ok = new
        .dl
        .iter()
        .all(|s| s.label.is_some() || s.scheduler_name.is_some() || s.params.static_params.is_some());
    let ul_ok = new
        .ul
        .iter()
        .all(|s| s.label.is_some() || s.scheduler_name.is_some() || s.params.static_params.is_some());
    if dl_ok && ul_ok {
        Ok(())
    } else {
        Err(RrmError::InvalidArgument("all slices need to have an ID and parameters".to_string()))
    }
}

/// Walk the DL slices in order, marking each one's claimed RBGs; a second
/// claim on an already-marked RBG is the original system's "overlapping
/// slices" rejection.
fn detect_dl_overlap(dl: &[DlSlice], rbg_count: u8) -> Result<(), RrmError> {
    let mut owner: Vec<bool> = vec![false; usize::from(rbg_count)];
    for slice in dl {
        let Some(pos) = slice.params.static_params else { continue };
        let low = usize::from(pos.position_low);
        let high = usize::from(pos.position_high);
        for rbg in low..=high {
            let Some(slot) = owner.get_mut(rbg) else { continue };
            if *slot {
                return Err(RrmError::InvalidArgument(format!(
                    "overlapping slices at RBG {rbg} for slice {}",
                    slice.id
                )));
            }
            *slot = true;
        }
    }
    Ok(())
}

fn validate_nvs(new: &SliceConfig) -> Result<(), RrmError> {
    let mut pct_total: u32 = 0;
    for slice in &new.dl {
        let Some(nvs) = slice.params.nvs else {
            return Err(RrmError::InvalidArgument(format!(
                "slice {} missing nvs parameters",
                slice.id
            )));
        };
        match (nvs.pct_reserved, nvs.kbps_required, nvs.kbps_reference) {
            (Some(pct), _, _) => pct_total = pct_total.saturating_add(u32::from(pct)),
            (None, Some(_), Some(_)) => {}
            _ => {
                return Err(RrmError::InvalidArgument(format!(
                    "slice {} needs either a reserved percentage or a required/reference rate pair",
                    slice.id
                )))
            }
        }
    }
    if pct_total > 100 {
        return Err(RrmError::InvalidArgument("nvs reserved percentage exceeds 100".to_string()));
    }
    Ok(())
}

fn validate_scn19(new: &SliceConfig) -> Result<(), RrmError> {
    for slice in &new.dl {
        if slice.params.scn19.is_none() {
            return Err(RrmError::InvalidArgument(format!(
                "slice {} missing scn19 parameters",
                slice.id
            )));
        }
    }
    for slice in &new.ul {
        if slice.params.scn19.is_none() {
            return Err(RrmError::InvalidArgument(format!(
                "slice {} missing scn19 parameters",
                slice.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ranctl_types::{DlAlgoParams, StaticDlParams, StaticUlParams, UlAlgoParams};

    use super::*;

    fn static_slice(id: u8, low: u8, high: u8) -> DlSlice {
        DlSlice {
            id: SliceId(id),
            label: Some("t".to_string()),
            percentage: None,
            isolation: None,
            priority: None,
            params: DlAlgoParams {
                static_params: Some(StaticDlParams { position_low: low, position_high: high }),
                ..DlAlgoParams::default()
            },
            maxmcs: None,
            sorting: None,
            accounting: None,
            scheduler_name: None,
        }
    }

    fn static_ul_slice(id: u8, low: u8, high: u8) -> UlSlice {
        UlSlice {
            id: SliceId(id),
            label: Some("t".to_string()),
            percentage: None,
            isolation: None,
            priority: None,
            params: UlAlgoParams {
                static_params: Some(StaticUlParams { position_low: low, position_high: high }),
                ..UlAlgoParams::default()
            },
            maxmcs: None,
            accounting: None,
            scheduler_name: None,
        }
    }

    fn nvs_slice(id: u8, pct: u8) -> DlSlice {
        DlSlice {
            id: SliceId(id),
            label: None,
            percentage: None,
            isolation: None,
            priority: None,
            params: DlAlgoParams {
                nvs: Some(ranctl_types::NvsParams {
                    pct_reserved: Some(pct),
                    kbps_required: None,
                    kbps_reference: None,
                }),
                ..DlAlgoParams::default()
            },
            maxmcs: None,
            sorting: None,
            accounting: None,
            scheduler_name: None,
        }
    }

    fn nvs_ul_slice(id: u8, pct: u8) -> UlSlice {
        UlSlice {
            id: SliceId(id),
            label: None,
            percentage: None,
            isolation: None,
            priority: None,
            params: UlAlgoParams {
                nvs: Some(ranctl_types::NvsParams {
                    pct_reserved: Some(pct),
                    kbps_required: None,
                    kbps_reference: None,
                }),
                ..UlAlgoParams::default()
            },
            maxmcs: None,
            accounting: None,
            scheduler_name: None,
        }
    }

    #[test]
    fn overlap_is_rejected_with_original_message_shape() {
        let dl = vec![static_slice(0, 0, 3), static_slice(4, 2, 5)];
        let Err(err) = detect_dl_overlap(&dl, 17) else {
            return assert!(false, "expected an overlap error");
        };
        assert_eq!(err.to_string(), "overlapping slices at RBG 2 for slice 4");
    }

    #[test]
    fn disjoint_ranges_are_accepted() {
        assert!(detect_dl_overlap(&[static_slice(0, 0, 3), static_slice(1, 4, 5)], 17).is_ok());
    }

    #[test]
    fn migration_between_non_none_algorithms_is_unsupported() {
        assert!(!migration_supported(SliceAlgorithm::Static, SliceAlgorithm::Nvs));
        assert!(migration_supported(SliceAlgorithm::None, SliceAlgorithm::Static));
    }

    #[test]
    fn nvs_requires_share_or_rate_pair() {
        let mut cfg = SliceConfig { algorithm: SliceAlgorithm::Nvs, ..SliceConfig::default() };
        cfg.dl.push(DlSlice {
            id: SliceId(0),
            label: None,
            percentage: None,
            isolation: None,
            priority: None,
            params: DlAlgoParams::default(),
            maxmcs: None,
            sorting: None,
            accounting: None,
            scheduler_name: None,
        });
        assert!(validate_nvs(&cfg).is_err());
    }

    #[test]
    fn infers_static_algorithm_from_slice_params_when_omitted() {
        let dl = vec![static_slice(3, 0, 5)];
        assert_eq!(infer_algorithm(&dl, &[]), Some(SliceAlgorithm::Static));
    }

    #[test]
    fn infers_nothing_from_an_empty_update() {
        assert_eq!(infer_algorithm(&[], &[]), None);
    }

    #[test]
    fn fill_algorithm_leaves_an_explicit_choice_alone() {
        let mut new = SliceConfig { algorithm: SliceAlgorithm::Nvs, ..SliceConfig::default() };
        let current = SliceConfig { algorithm: SliceAlgorithm::Static, ..SliceConfig::default() };
        fill_algorithm(&mut new, &current);
        assert_eq!(new.algorithm, SliceAlgorithm::Nvs);
    }

    #[test]
    fn merge_by_id_keeps_untouched_slices_and_appends_new_ones() {
        let current = vec![static_slice(0, 0, 1), static_slice(3, 2, 5)];
        let incoming = vec![static_slice(4, 6, 7)];
        let merged = merge_by_id(incoming, &current, |s| s.id);
        let ids: Vec<u8> = merged.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![0, 3, 4]);
    }

    #[test]
    fn merge_by_id_replaces_an_existing_slice_in_place() {
        let current = vec![static_slice(0, 0, 1), static_slice(3, 2, 5)];
        let incoming = vec![static_slice(3, 10, 12)];
        let merged = merge_by_id(incoming, &current, |s| s.id);
        assert_eq!(merged.len(), 2);
        let Some(slice3) = merged.iter().find(|s| s.id == SliceId(3)) else {
            return assert!(false, "slice 3 missing after merge");
        };
        assert_eq!(slice3.params.static_params.map(|p| p.position_low), Some(10));
    }

    fn bs_with_one_cell(rib: &mut Rib, bs_id: BsId) {
        rib.add_pending_agent(ranctl_types::AgentId(1), 0);
        let _ = rib.record_hello(ranctl_types::AgentId(1), bs_id);
        let _ = rib.register_capabilities(
            ranctl_types::AgentId(1),
            ranctl_types::CapabilitySet::from_caps([ranctl_types::Capability::Rrc]),
            0,
        );
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
                slice_config: SliceConfig::default(),
                raw_extra: serde_json::Value::Null,
            }],
        );
    }

    #[tokio::test]
    async fn creating_a_static_slice_with_no_algorithm_field_succeeds() {
        let mut rib = Rib::new();
        let bs_id = BsId(1);
        bs_with_one_cell(&mut rib, bs_id);
        let Ok(net) = NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        let request =
            SliceConfig { dl: vec![static_slice(3, 0, 5)], ul: vec![static_ul_slice(3, 0, 5)], ..SliceConfig::default() };
        assert!(apply_slice_config(&mut rib, &net, bs_id, 0, request).is_ok());
        let Some(bs) = rib.get_bs(bs_id) else { return assert!(false, "bs missing") };
        let Some(cell) = bs.cells().first() else { return assert!(false, "cell missing") };
        assert_eq!(cell.slice_config.algorithm, SliceAlgorithm::Static);
        assert!(cell.slice_config.dl_slice(SliceId(3)).is_some());
    }

    #[tokio::test]
    async fn reapplying_the_same_config_is_a_no_op() {
        let mut rib = Rib::new();
        let bs_id = BsId(1);
        bs_with_one_cell(&mut rib, bs_id);
        let Ok(net) = NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        let request =
            SliceConfig { dl: vec![static_slice(3, 0, 5)], ul: vec![static_ul_slice(3, 0, 5)], ..SliceConfig::default() };
        assert!(apply_slice_config(&mut rib, &net, bs_id, 0, request.clone()).is_ok());
        assert!(apply_slice_config(&mut rib, &net, bs_id, 0, request).is_ok());
    }

    #[tokio::test]
    async fn a_new_slice_is_checked_for_overlap_against_existing_slices() {
        let mut rib = Rib::new();
        let bs_id = BsId(1);
        bs_with_one_cell(&mut rib, bs_id);
        let Ok(net) = NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        let first =
            SliceConfig { dl: vec![static_slice(3, 0, 5)], ul: vec![static_ul_slice(3, 0, 5)], ..SliceConfig::default() };
        assert!(apply_slice_config(&mut rib, &net, bs_id, 0, first).is_ok());

        let second = SliceConfig { dl: vec![static_slice(4, 2, 7)], ..SliceConfig::default() };
        let Err(err) = apply_slice_config(&mut rib, &net, bs_id, 0, second) else {
            return assert!(false, "expected an overlap rejection");
        };
        assert_eq!(err.to_string(), "overlapping slices at RBG 2 for slice 4");
    }

    fn bs_with_nvs_slice_zero(rib: &mut Rib, bs_id: BsId) {
        rib.add_pending_agent(ranctl_types::AgentId(1), 0);
        let _ = rib.record_hello(ranctl_types::AgentId(1), bs_id);
        let _ = rib.register_capabilities(
            ranctl_types::AgentId(1),
            ranctl_types::CapabilitySet::from_caps([ranctl_types::Capability::Rrc]),
            0,
        );
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
                slice_config: SliceConfig {
                    algorithm: SliceAlgorithm::Nvs,
                    dl: vec![nvs_slice(0, 100)],
                    ul: vec![nvs_ul_slice(0, 100)],
                    ..SliceConfig::default()
                },
                raw_extra: serde_json::Value::Null,
            }],
        );
    }

    #[tokio::test]
    async fn create_slice_copies_slice_zero_and_appends_it() {
        let mut rib = Rib::new();
        let bs_id = BsId(1);
        bs_with_nvs_slice_zero(&mut rib, bs_id);
        let Ok(net) = NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        assert!(create_slice(&mut rib, &net, bs_id, 0, SliceId(5)).is_ok());
        let current = current_slice_config(&rib, bs_id, 0).unwrap_or_default();
        assert!(current.dl_slice(SliceId(5)).is_some());
        assert!(current.ul_slice(SliceId(5)).is_some());
        assert!(current.dl_slice(SliceId(0)).is_some());
    }

    #[tokio::test]
    async fn remove_slice_actually_drops_it_and_does_not_get_merged_back() {
        let mut rib = Rib::new();
        let bs_id = BsId(1);
        bs_with_nvs_slice_zero(&mut rib, bs_id);
        let Ok(net) = NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        assert!(create_slice(&mut rib, &net, bs_id, 0, SliceId(5)).is_ok());
        assert!(remove_slice(&mut rib, &net, bs_id, 0, SliceId(5)).is_ok());
        let current = current_slice_config(&rib, bs_id, 0).unwrap_or_default();
        assert!(current.dl_slice(SliceId(5)).is_none());
        assert!(current.ul_slice(SliceId(5)).is_none());
        assert!(current.dl_slice(SliceId(0)).is_some());
    }

    #[tokio::test]
    async fn removing_slice_zero_is_rejected() {
        let mut rib = Rib::new();
        let bs_id = BsId(1);
        bs_with_nvs_slice_zero(&mut rib, bs_id);
        let Ok(net) = NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        assert!(remove_slice(&mut rib, &net, bs_id, 0, SliceId(0)).is_err());
    }
}
