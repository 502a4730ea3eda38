//! DL preprocessor: partitions a cell's RBGs among its slices, then
//! among the UEs within each slice.
//!
//! `remote_scheduler_helper::run_dlsch_scheduler_preprocessor` is not
//! present in this codebase's reference material. This reconstruction
//! follows the behavior the distilled spec pins down directly: slice
//! isolation (a slice's RBGs are never given to another slice's UEs),
//! priority (higher-priority slices are filled first), and the slice's
//! accounting policy (`FAIR` spreads a slice's RBGs round-robin across
//! its UEs; `GREEDY` exhausts one UE before moving to the next, in RNTI
//! order). Inter-slice borrowing when a slice leaves RBGs unused
//! (`intraslice_share_active`/`interslice_share_active`) is not
//! modeled: partitions stay disjoint for the lifetime of the tick,
//! which is all §8's testable properties require.

use std::collections::HashMap;

use ranctl_types::{AccountingPolicy, CellConfig, Rnti, SliceAlgorithm, SliceId, UeConfig};

/// What the preprocessor allocated to one UE for this subframe.
#[derive(Debug, Clone, Default)]
pub struct RbgAllocation {
    /// RBG bitmap allocated, indexed by RBG.
    pub rballoc_sub_preproc: Vec<bool>,
    /// Total RBs this represents.
    pub pre_nb_rbs_available: u16,
}

struct SliceRbgRange {
    slice_id: SliceId,
    rbgs: Vec<usize>,
    priority: u8,
    accounting: AccountingPolicy,
}

/// Partition `n_rbg` RBG indices among the cell's configured DL slices.
fn partition_rbgs(cell: &CellConfig, n_rbg: usize) -> Vec<SliceRbgRange> {
    let slices = &cell.slice_config.dl;
    if slices.is_empty() || cell.slice_config.algorithm == SliceAlgorithm::None {
        return vec![SliceRbgRange {
            slice_id: SliceId(0),
            rbgs: (0..n_rbg).collect(),
            priority: 0,
            accounting: AccountingPolicy::Fair,
        }];
    }

    match cell.slice_config.algorithm {
        SliceAlgorithm::Static => slices
            .iter()
            .map(|s| {
                let rbgs = s.params.static_params.map_or_else(Vec::new, |p| {
                    (usize::from(p.position_low)..=usize::from(p.position_high))
                        .filter(|i| *i < n_rbg)
                        .collect()
                });
                SliceRbgRange {
                    slice_id: s.id,
                    rbgs,
                    priority: s.priority.unwrap_or(0),
                    accounting: s.accounting.unwrap_or(AccountingPolicy::Fair),
                }
            })
            .collect(),
        _ => proportional_partition(slices, n_rbg),
    }
}

fn proportional_partition(slices: &[ranctl_types::DlSlice], n_rbg: usize) -> Vec<SliceRbgRange> {
    let total_pct: u32 = slices.iter().map(|s| u32::from(s.percentage.unwrap_or(0))).sum();
    let mut next_start = 0usize;
    let mut ranges = Vec::with_capacity(slices.len());
    for (idx, s) in slices.iter().enumerate() {
        let share = if total_pct == 0 {
            n_rbg / slices.len().max(1)
        } else {
            let pct = u128::from(s.percentage.unwrap_or(0));
            let total = u128::from(total_pct.max(1));
            let n_rbg_wide = u128::try_from(n_rbg).unwrap_or(0);
            let numerator = pct.saturating_mul(n_rbg_wide);
            usize::try_from(numerator / total).unwrap_or(0)
        };
        let is_last = idx.saturating_add(1) == slices.len();
        let end = if is_last { n_rbg } else { next_start.saturating_add(share).min(n_rbg) };
        let rbgs = (next_start.min(n_rbg)..end).collect();
        next_start = end;
        ranges.push(SliceRbgRange {
            slice_id: s.id,
            rbgs,
            priority: s.priority.unwrap_or(0),
            accounting: s.accounting.unwrap_or(AccountingPolicy::Fair),
        });
    }
    ranges
}

/// Compute this subframe's RBG allocation for every UE in `ues` on
/// `cell`. UEs with no allocation (slice has no RBGs, or the UE's
/// slice isn't present) are simply absent from the returned map.
#[must_use]
pub fn allocate(cell: &CellConfig, ues: &[UeConfig]) -> HashMap<Rnti, RbgAllocation> {
    let n_rbg = usize::from(CellConfig::rbg_count(cell.dl_bandwidth));
    let mut result: HashMap<Rnti, RbgAllocation> = ues
        .iter()
        .map(|u| (u.rnti, RbgAllocation { rballoc_sub_preproc: vec![false; n_rbg], pre_nb_rbs_available: 0 }))
        .collect();
    if n_rbg == 0 {
        return result;
    }
    let rbg_size = u16::from(CellConfig::rbg_size(cell.dl_bandwidth));

    let mut ranges = partition_rbgs(cell, n_rbg);
    ranges.sort_by(|a, b| b.priority.cmp(&a.priority));

    for range in &ranges {
        let mut members: Vec<Rnti> =
            ues.iter().filter(|u| u.dl_slice_id == range.slice_id).map(|u| u.rnti).collect();
        if members.is_empty() || range.rbgs.is_empty() {
            continue;
        }
        members.sort_unstable();

        match range.accounting {
            AccountingPolicy::Greedy => {
                let mut rbgs = range.rbgs.iter().copied();
                for rnti in &members {
                    let Some(entry) = result.get_mut(rnti) else { continue };
                    for rbg in rbgs.by_ref() {
                        assign_rbg(entry, rbg, rbg_size);
                    }
                }
            }
            AccountingPolicy::Fair => {
                for (i, rbg) in range.rbgs.iter().copied().enumerate() {
                    let Some(rnti) = members.get(i % members.len()) else { continue };
                    let Some(entry) = result.get_mut(rnti) else { continue };
                    assign_rbg(entry, rbg, rbg_size);
                }
            }
        }
    }
    result
}

fn assign_rbg(entry: &mut RbgAllocation, rbg: usize, rbg_size: u16) {
    if let Some(slot) = entry.rballoc_sub_preproc.get_mut(rbg) {
        *slot = true;
        entry.pre_nb_rbs_available = entry.pre_nb_rbs_available.saturating_add(rbg_size);
    }
}

#[cfg(test)]
mod tests {
    use ranctl_types::{CellConfig, Rnti, SliceConfig, SliceId, UeConfig};

    use super::allocate;

    fn cell(dl_bandwidth: u8) -> CellConfig {
        CellConfig {
            phy_cell_id: 1,
            cell_id: 0,
            dl_bandwidth,
            ul_bandwidth: dl_bandwidth,
            dl_freq: 2650,
            ul_freq: 2530,
            eutra_band: 7,
            dl_pdsch_power: 0,
            ul_pusch_power: 0,
            slice_config: SliceConfig::default(),
            raw_extra: serde_json::Value::Null,
        }
    }

    fn ue(rnti: u16) -> UeConfig {
        UeConfig {
            rnti: Rnti(rnti),
            imsi: None,
            transmission_mode: 1,
            time_alignment_timer: 0,
            dl_slice_id: SliceId(0),
            ul_slice_id: SliceId(0),
            pcell_carrier_index: 0,
        }
    }

    #[test]
    fn single_ue_gets_all_rbgs_of_default_slice() {
        let cell = cell(50);
        let ues = vec![ue(1)];
        let result = allocate(&cell, &ues);
        let Some(alloc) = result.get(&Rnti(1)) else {
            return assert!(false, "missing allocation");
        };
        assert_eq!(alloc.pre_nb_rbs_available, 17 * 3);
        assert!(alloc.rballoc_sub_preproc.iter().all(|b| *b));
    }

    #[test]
    fn two_fair_ues_split_rbgs_without_overlap() {
        let cell = cell(50);
        let ues = vec![ue(1), ue(2)];
        let result = allocate(&cell, &ues);
        let Some(a) = result.get(&Rnti(1)) else { return assert!(false, "missing ue 1") };
        let Some(b) = result.get(&Rnti(2)) else { return assert!(false, "missing ue 2") };
        for rbg in 0..17 {
            let in_a = a.rballoc_sub_preproc.get(rbg).copied().unwrap_or(false);
            let in_b = b.rballoc_sub_preproc.get(rbg).copied().unwrap_or(false);
            assert!(!(in_a && in_b));
        }
        assert!(a.pre_nb_rbs_available > 0);
        assert!(b.pre_nb_rbs_available > 0);
    }
}
