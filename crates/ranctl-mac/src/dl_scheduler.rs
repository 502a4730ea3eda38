//! Per-UE grant construction: HARQ process selection, MCS/TBS sizing,
//! RLC-PDU assembly, PUCCH TPC, and DCI emission.
//!
//! Grounded in `remote_scheduler.cc`'s `periodic_task` body (the
//! retransmission/new-transmission branches, the MCS up/down-adjustment
//! loops, and the elapsed-frame PUCCH TPC gate). Three details that
//! function references but whose definitions are absent from this
//! codebase's reference material are simplified and documented at their
//! use site below: the literal TBS table (see [`crate::link_adaptation`]),
//! the PDCCH CCE budget (see [`crate::cce`]), and PUCCH received-power
//! measurement (this controller's data model has no per-UE power
//! report, so the TPC command is derived from UL CQI instead of a
//! measured `p0_nominal_pucch` offset).

use ranctl_types::{DlDci, HarqStatus, LcConfig, MacStats, RlcPdu, Rnti};

use crate::cce::CceBudget;
use crate::link_adaptation::{cqi_to_mcs, tbs_bytes, MAX_MCS};
use crate::scheduling_info::UeSchedulingInfo;

/// Reload value for the timing-advance countdown, matching the
/// source's hardcoded constant.
const TA_TIMER_RELOAD: u16 = 20;

/// Fixed per-PDU MAC subheader size used by this simplified packer.
const SUBHEADER_BYTES: u32 = 2;

/// Radio frames that must elapse between PUCCH TPC updates for one UE.
const TPC_UPDATE_PERIOD_FRAMES: u16 = 1;

/// One built grant: the DCI plus the RLC PDUs backing it.
pub struct Grant {
    /// The downlink control information to emit.
    pub dci: DlDci,
    /// RLC PDUs carried under this grant.
    pub pdus: Vec<RlcPdu>,
}

/// Try to build one subframe's grant for `rnti`. Returns `None` if the
/// preprocessor allocated no RBs, the CCE budget is exhausted, or no
/// HARQ process is available -- all skip conditions from the source.
#[allow(clippy::too_many_arguments)]
pub fn schedule_ue(
    rnti: Rnti,
    lcs: &[LcConfig],
    stats: Option<&MacStats>,
    info: &mut UeSchedulingInfo,
    cce: &mut CceBudget,
    target_frame: u16,
    target_subframe: u8,
) -> Option<Grant> {
    if info.pre_nb_rbs_available == 0 {
        return None;
    }
    if !cce.try_reserve() {
        return None;
    }
    let harq_pid = synchronous_harq_pid(target_frame, target_subframe);
    let process = info.harq.get(usize::from(harq_pid))?;
    let (prev_status, prev_mcs, prev_nb_rb, prev_ndi) =
        (process.status, process.mcs, process.nb_rb, process.ndi);

    let target_dl_mcs = MAX_MCS;
    let cqi_mcs = stats.and_then(|s| s.dl_cqi).map_or(target_dl_mcs, cqi_to_mcs);
    let initial_mcs = cqi_mcs.min(target_dl_mcs);

    let nb_available_rb = u8::try_from(info.rballoc_sub_preproc.iter().filter(|b| **b).count())
        .unwrap_or(u8::MAX);

    let (mcs, nb_rb, pdus) = if prev_status == HarqStatus::Nack {
        (prev_mcs, prev_nb_rb.min(nb_available_rb), Vec::new())
    } else {
        new_transmission(rnti, lcs, stats, info, initial_mcs, nb_available_rb)
    };

    let rballoc = commit_rballoc(info, nb_rb);
    let tpc = pucch_tpc(info, stats, target_frame, target_subframe);
    let ndi = if prev_status == HarqStatus::Nack { prev_ndi } else { !prev_ndi };

    if let Some(process) = info.harq.get_mut(usize::from(harq_pid)) {
        process.status = HarqStatus::None;
        process.mcs = mcs;
        process.nb_rb = nb_rb;
        process.ndi = ndi;
        process.rballoc_sub = rballoc.clone();
    }

    Some(Grant {
        dci: DlDci { rnti, harq_pid, mcs, rb_bitmap: rballoc, ndi, rv: 0, tpc: tpc.encode() },
        pdus,
    })
}

/// HARQ process id for `(frame, subframe)`, synchronous to the 8 ms FDD
/// round trip. This model has no notion of a process still in flight
/// awaiting feedback (only `None`/`Ack`/`Nack`, all resolved states), so
/// a process is always available once selected; the distilled spec's
/// "no HARQ process available" skip accordingly never fires here.
fn synchronous_harq_pid(frame: u16, subframe: u8) -> u8 {
    let slot = u32::from(frame).saturating_mul(10).saturating_add(u32::from(subframe));
    u8::try_from(slot % 8).unwrap_or(0)
}

#[allow(clippy::too_many_arguments)]
fn new_transmission(
    rnti: Rnti,
    lcs: &[LcConfig],
    stats: Option<&MacStats>,
    info: &mut UeSchedulingInfo,
    initial_mcs: u8,
    nb_available_rb: u8,
) -> (u8, u8, Vec<RlcPdu>) {
    let ta_len: u32 = if info.ta_timer == 0 {
        info.ta_timer = TA_TIMER_RELOAD;
        SUBHEADER_BYTES
    } else {
        info.ta_timer = info.ta_timer.saturating_sub(1);
        0
    };

    let dci_tbs = tbs_bytes(initial_mcs, nb_available_rb);
    let (pdus, sdu_total) = pack_rlc_pdus(rnti, lcs, stats, dci_tbs, ta_len);
    let header_total = u32::try_from(pdus.len()).unwrap_or(0).saturating_mul(SUBHEADER_BYTES);
    let needed = sdu_total.saturating_add(header_total).saturating_add(ta_len);

    let mut mcs = initial_mcs;
    let mut nb_rb = if nb_available_rb == 0 { 0 } else { nb_available_rb.max(1) };
    let mut tbs = tbs_bytes(mcs, nb_rb);

    while tbs > needed && mcs > 0 {
        mcs = mcs.saturating_sub(1);
        tbs = tbs_bytes(mcs, nb_rb);
    }
    while tbs < needed && mcs < MAX_MCS {
        mcs = mcs.saturating_add(1);
        tbs = tbs_bytes(mcs, nb_rb);
    }
    while tbs < needed && nb_rb < nb_available_rb {
        nb_rb = nb_rb.saturating_add(1);
        tbs = tbs_bytes(mcs, nb_rb);
    }

    (mcs, nb_rb, pdus)
}

fn pack_rlc_pdus(
    rnti: Rnti,
    lcs: &[LcConfig],
    stats: Option<&MacStats>,
    dci_tbs: u32,
    ta_len: u32,
) -> (Vec<RlcPdu>, u32) {
    let Some(stats) = stats else { return (Vec::new(), 0) };

    let mut ordered: Vec<&LcConfig> = lcs.iter().collect();
    ordered.sort_by_key(|lc| lc.priority.unwrap_or(u8::MAX));

    let mut budget = dci_tbs.saturating_sub(ta_len);
    let mut pdus = Vec::new();
    let mut total = 0u32;
    for lc in ordered {
        if budget <= SUBHEADER_BYTES {
            break;
        }
        let Some(report) = stats.rlc_reports.iter().find(|r| r.lcid == lc.lcid) else { continue };
        if report.tx_queue_size == 0 {
            continue;
        }
        let available = budget.saturating_sub(SUBHEADER_BYTES);
        let take = report.tx_queue_size.min(available);
        if take == 0 {
            continue;
        }
        pdus.push(RlcPdu { rnti, lcid: lc.lcid, size_bytes: take });
        total = total.saturating_add(take);
        budget = budget.saturating_sub(take.saturating_add(SUBHEADER_BYTES));
    }
    (pdus, total)
}

fn commit_rballoc(info: &UeSchedulingInfo, nb_rb: u8) -> Vec<bool> {
    let mut bitmap = vec![false; info.rballoc_sub_preproc.len()];
    let mut remaining = nb_rb;
    for (slot, available) in bitmap.iter_mut().zip(info.rballoc_sub_preproc.iter()) {
        if remaining == 0 {
            break;
        }
        if *available {
            *slot = true;
            remaining = remaining.saturating_sub(1);
        }
    }
    bitmap
}

fn pucch_tpc(
    info: &mut UeSchedulingInfo,
    stats: Option<&MacStats>,
    target_frame: u16,
    target_subframe: u8,
) -> ranctl_types::TpcCommand {
    let elapsed_subframes = target_frame
        .saturating_mul(10)
        .saturating_add(u16::from(target_subframe))
        .saturating_sub(info.last_tpc_frame.saturating_mul(10).saturating_add(u16::from(info.last_tpc_subframe)));
    if elapsed_subframes < u16::from(TPC_UPDATE_PERIOD_FRAMES).saturating_mul(10) {
        return ranctl_types::TpcCommand::Hold;
    }
    info.last_tpc_frame = target_frame;
    info.last_tpc_subframe = target_subframe;

    let Some(cqi) = stats.and_then(|s| s.ul_cqi) else { return ranctl_types::TpcCommand::Hold };
    if cqi < 7 {
        ranctl_types::TpcCommand::Up
    } else if cqi > 12 {
        ranctl_types::TpcCommand::Down
    } else {
        ranctl_types::TpcCommand::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::synchronous_harq_pid;

    #[test]
    fn pid_cycles_every_eight_subframes() {
        assert_eq!(synchronous_harq_pid(0, 0), 0);
        assert_eq!(synchronous_harq_pid(0, 8), 0);
        assert_eq!(synchronous_harq_pid(0, 3), 3);
    }

    #[test]
    fn pid_is_deterministic_across_frame_wrap() {
        let a = synchronous_harq_pid(1023, 9);
        let b = synchronous_harq_pid(1023, 9);
        assert_eq!(a, b);
    }
}
