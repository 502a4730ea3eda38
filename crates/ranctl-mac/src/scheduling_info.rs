//! Per-BS scheduling bookkeeping the MAC scheduler carries across ticks.

use std::collections::HashMap;

pub use ranctl_types::UeSchedulingInfo;
use ranctl_types::{BsId, Rnti};

/// Scheduling state for one BS: each UE's HARQ/preprocessor bookkeeping
/// plus the last (frame, subframe) this BS was scheduled for, so a
/// repeated call for the same slot is a no-op.
#[derive(Debug, Default)]
pub struct BsSchedulingState {
    ues: HashMap<Rnti, UeSchedulingInfo>,
    last_scheduled: Option<(u16, u8)>,
}

impl BsSchedulingState {
    /// Whether `(frame, subframe)` still needs scheduling for this BS.
    pub const fn needs_scheduling(&self, frame: u16, subframe: u8) -> bool {
        match self.last_scheduled {
            Some((f, s)) => f != frame || s != subframe,
            None => true,
        }
    }

    /// Record that this BS has now been scheduled for `(frame,
    /// subframe)`.
    pub fn mark_scheduled(&mut self, frame: u16, subframe: u8) {
        self.last_scheduled = Some((frame, subframe));
    }

    /// Get or create the scheduling record for `rnti`, sized for
    /// `n_rbg` RBGs.
    pub fn entry(&mut self, rnti: Rnti, n_rbg: usize) -> &mut UeSchedulingInfo {
        self.ues.entry(rnti).or_insert_with(|| UeSchedulingInfo::new(rnti, n_rbg))
    }

    /// Drop bookkeeping for UEs no longer present in the RIB, so a
    /// reconnecting RNTI starts with fresh HARQ state.
    pub fn retain_known(&mut self, known: &[Rnti]) {
        self.ues.retain(|rnti, _| known.contains(rnti));
    }

    /// Mutable views over every currently-tracked UE, for the
    /// preprocessor.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Rnti, &mut UeSchedulingInfo)> {
        self.ues.iter_mut().map(|(rnti, info)| (*rnti, info))
    }

    /// The scheduling record for `rnti`, if tracked.
    pub fn get_mut(&mut self, rnti: Rnti) -> Option<&mut UeSchedulingInfo> {
        self.ues.get_mut(&rnti)
    }
}

/// All BSs' scheduling state, owned by [`crate::MacSchedulerApp`] across
/// ticks.
#[derive(Debug, Default)]
pub struct SchedulerState {
    bs: HashMap<BsId, BsSchedulingState>,
}

impl SchedulerState {
    /// An empty state, before any BS has been scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the scheduling record for `bs_id`.
    pub fn bs_entry(&mut self, bs_id: BsId) -> &mut BsSchedulingState {
        self.bs.entry(bs_id).or_default()
    }

    /// Drop bookkeeping for BSs no longer present in the RIB.
    pub fn retain_known(&mut self, known: &[BsId]) {
        self.bs.retain(|bs_id, _| known.contains(bs_id));
    }
}

/// Advance `(frame, subframe)` by `schedule_ahead` subframes, wrapping
/// subframe at 10 and frame at 1024.
#[must_use]
pub fn advance(frame: u16, subframe: u8, schedule_ahead: u8) -> (u16, u8) {
    let total = u16::from(subframe).saturating_add(u16::from(schedule_ahead));
    let target_subframe = u8::try_from(total % 10).unwrap_or(0);
    let additional_frames = total / 10;
    let target_frame =
        u16::try_from((u32::from(frame).saturating_add(u32::from(additional_frames))) % 1024)
            .unwrap_or(0);
    (target_frame, target_subframe)
}

#[cfg(test)]
mod tests {
    use super::advance;

    #[test]
    fn wraps_subframe_and_frame() {
        assert_eq!(advance(0, 9, 2), (1, 1));
        assert_eq!(advance(1023, 9, 2), (0, 1));
    }

    #[test]
    fn no_wrap_stays_in_frame() {
        assert_eq!(advance(5, 2, 2), (5, 4));
    }
}
