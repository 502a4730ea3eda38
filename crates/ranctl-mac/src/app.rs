//! [`MacSchedulerApp`]: the per-tick app that drives [`crate::dl_scheduler`]
//! across every BS, cell, and UE.

use ranctl_events::EventBus;
use ranctl_net::NetworkInterface;
use ranctl_rib::Rib;
use ranctl_types::{BsId, CellConfig, ControlMessage, DlMacConfig, Rnti};

use crate::cce::CceBudget;
use crate::dl_scheduler;
use crate::preprocessor;
use crate::scheduling_info::{advance, SchedulerState};

/// How many subframes ahead the scheduler prepares grants for, matching
/// `remote_scheduler`'s `schedule_ahead` constant.
const SCHEDULE_AHEAD: u8 = 4;

/// Subframes never scheduled on the FDD baseline (PBCH/SIB).
const UNSCHEDULED_SUBFRAMES: [u8; 2] = [0, 5];

/// Per-tick app running the remote MAC scheduler over every known BS.
#[derive(Default)]
pub struct MacSchedulerApp {
    state: SchedulerState,
}

impl MacSchedulerApp {
    /// A scheduler with no carried-over HARQ state.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ranctl_scheduler::TickApp for MacSchedulerApp {
    fn name(&self) -> &str {
        "remote-mac-scheduler"
    }

    fn run(
        &mut self,
        rib: &mut Rib,
        net: &NetworkInterface,
        _bus: &mut EventBus,
        _now_ms: u64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bs_ids: Vec<BsId> = rib.available_bs().collect();
        self.state.retain_known(&bs_ids);

        for bs_id in bs_ids {
            let Some(bs) = rib.get_bs(bs_id) else { continue };
            let (current_frame, current_subframe) = bs.current_subframe();
            let ue_rntis: Vec<Rnti> = bs.ues().map(|u| u.rnti).collect();

            let bs_state = self.state.bs_entry(bs_id);
            bs_state.retain_known(&ue_rntis);
            if !bs_state.needs_scheduling(current_frame, current_subframe) {
                continue;
            }
            bs_state.mark_scheduled(current_frame, current_subframe);

            let (target_frame, target_subframe) =
                advance(current_frame, current_subframe, SCHEDULE_AHEAD);
            if UNSCHEDULED_SUBFRAMES.contains(&target_subframe) {
                continue;
            }

            let mut dcis = Vec::new();
            let mut pdus = Vec::new();

            for cell in bs.cells() {
                let n_rbg = usize::from(CellConfig::rbg_count(cell.dl_bandwidth));
                if n_rbg == 0 {
                    continue;
                }
                let cell_ues: Vec<_> = bs
                    .ues()
                    .filter(|u| u16::from(u.pcell_carrier_index) == cell.cell_id)
                    .copied()
                    .collect();
                if cell_ues.is_empty() {
                    continue;
                }

                let allocations = preprocessor::allocate(cell, &cell_ues);
                let mut cce = CceBudget::new(cell.dl_bandwidth);

                for ue in &cell_ues {
                    let Some(alloc) = allocations.get(&ue.rnti) else { continue };
                    let info = bs_state.entry(ue.rnti, n_rbg);
                    info.pre_nb_rbs_available = alloc.pre_nb_rbs_available;
                    info.rballoc_sub_preproc.clone_from(&alloc.rballoc_sub_preproc);

                    let lcs = bs.lcs_for(ue.rnti);
                    let stats = bs.mac_stats_for(ue.rnti);
                    let Some(grant) = dl_scheduler::schedule_ue(
                        ue.rnti,
                        lcs,
                        stats,
                        info,
                        &mut cce,
                        target_frame,
                        target_subframe,
                    ) else {
                        continue;
                    };
                    dcis.push(grant.dci);
                    pdus.extend(grant.pdus);
                }
            }

            if dcis.is_empty() {
                continue;
            }

            let msg = ControlMessage::DlMacConfig(DlMacConfig {
                frame: target_frame,
                subframe: target_subframe,
                dcis,
                pdus,
            });
            if let Err(e) = ranctl_rib::send_message(rib, net, bs_id, msg) {
                tracing::warn!(%bs_id, error = %e, "failed to push dl_mac_config");
            }
        }

        Ok(())
    }
}
