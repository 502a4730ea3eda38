//! CQI-to-MCS mapping and transport-block-size estimation.
//!
//! The source's `get_TBS_DL` indexes the full 3GPP TS 36.213 §7.1.7 TBS
//! table (110 MCS/RB-count pairs) and its `cqi_to_mcs` table is a
//! similar static lookup; neither is present in this codebase's
//! reference material. Lower-layer PHY simulation is explicitly out of
//! scope here, so this module replaces both with a compact, monotonic
//! approximation: MCS and CQI both range 0-28, and TBS grows linearly
//! with allocated RBs and with MCS. This preserves every behavior the
//! scheduler actually depends on (monotonic in MCS and in RB count, so
//! the up/down adjustment loops converge) without claiming PHY-layer
//! accuracy.

/// Highest MCS index the scheduler will select.
pub const MAX_MCS: u8 = 28;

/// Map a wideband CQI report (0-15) to an initial MCS choice (0-28).
///
/// Monotonic and saturating; CQI 0 (out of range/no report) yields the
/// most robust MCS.
#[must_use]
pub fn cqi_to_mcs(cqi: u8) -> u8 {
    let cqi = cqi.min(15);
    let scaled = u32::from(cqi).saturating_mul(u32::from(MAX_MCS)) / 15;
    u8::try_from(scaled).unwrap_or(MAX_MCS)
}

/// Approximate transport-block size, in bytes, for `mcs` over `nb_rb`
/// resource blocks. Strictly increasing in both arguments.
#[must_use]
pub fn tbs_bytes(mcs: u8, nb_rb: u8) -> u32 {
    let mcs = mcs.min(MAX_MCS);
    let bits_per_rb_per_mcs_step: u32 = 12;
    let base_bits_per_rb: u32 = 24;
    let bits_per_rb =
        base_bits_per_rb.saturating_add(bits_per_rb_per_mcs_step.saturating_mul(u32::from(mcs)));
    bits_per_rb.saturating_mul(u32::from(nb_rb)) / 8
}

#[cfg(test)]
mod tests {
    use super::{cqi_to_mcs, tbs_bytes, MAX_MCS};

    #[test]
    fn cqi_to_mcs_is_monotonic() {
        let mut last = 0;
        for cqi in 0..=15u8 {
            let mcs = cqi_to_mcs(cqi);
            assert!(mcs >= last);
            last = mcs;
        }
        assert_eq!(cqi_to_mcs(15), MAX_MCS);
    }

    #[test]
    fn tbs_grows_with_mcs_and_rbs() {
        assert!(tbs_bytes(0, 10) < tbs_bytes(10, 10));
        assert!(tbs_bytes(10, 5) < tbs_bytes(10, 10));
    }

    #[test]
    fn tbs_clamps_oversized_mcs() {
        assert_eq!(tbs_bytes(28, 10), tbs_bytes(200, 10));
    }
}
