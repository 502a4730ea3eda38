//! Enumerations shared across the control plane.

use serde::{Deserialize, Serialize};

/// One layer an agent process can implement. A BS is fully covered when
/// the union of its agents' capabilities equals the full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Low PHY.
    LoPhy,
    /// High PHY.
    HiPhy,
    /// Low MAC.
    LoMac,
    /// High MAC.
    HiMac,
    /// Radio Link Control.
    Rlc,
    /// Packet Data Convergence Protocol.
    Pdcp,
    /// Service Data Adaptation Protocol.
    Sdap,
    /// Radio Resource Control.
    Rrc,
}

impl Capability {
    /// All capability kinds, in bit order.
    pub const ALL: [Self; 8] = [
        Self::LoPhy,
        Self::HiPhy,
        Self::LoMac,
        Self::HiMac,
        Self::Rlc,
        Self::Pdcp,
        Self::Sdap,
        Self::Rrc,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::LoPhy => 1 << 0,
            Self::HiPhy => 1 << 1,
            Self::LoMac => 1 << 2,
            Self::HiMac => 1 << 3,
            Self::Rlc => 1 << 4,
            Self::Pdcp => 1 << 5,
            Self::Sdap => 1 << 6,
            Self::Rrc => 1 << 7,
        }
    }
}

/// A bitset of [`Capability`] values carried by one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// An empty capability set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set from an iterator of capabilities.
    pub fn from_caps(caps: impl IntoIterator<Item = Capability>) -> Self {
        let mut set = Self::empty();
        for c in caps {
            set.insert(c);
        }
        set
    }

    /// Add one capability.
    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    /// Whether this set contains the given capability.
    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Merge another set into this one.
    pub fn merge(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Whether two sets share no capability.
    pub const fn is_orthogonal(self, other: Self) -> bool {
        self.0 & other.0 == 0
    }

    /// Whether this set covers every known capability (a full BS).
    pub const fn is_complete(self) -> bool {
        self.0 == 0xFF
    }

    /// List the capabilities present in this set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

/// Slice scheduling algorithm in effect for one BS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SliceAlgorithm {
    /// No slicing; the single-scheduler default.
    #[default]
    None,
    /// Static RBG partitioning.
    Static,
    /// Network Virtualization Substrate proportional sharing.
    Nvs,
    /// SCN19 dynamic/fixed/on-demand sharing.
    Scn19,
}

/// UE sort policy within one DL slice before accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortingPolicy {
    /// Highest HARQ round first.
    CrRound,
    /// Highest SRB1+2 first.
    CrSrb12,
    /// Highest head-of-line delay first.
    CrHol,
    /// Highest RLC buffer occupancy first.
    CrLc,
    /// Highest CQI first.
    CrCqi,
    /// Highest logical-channel priority first.
    CrLcp,
}

/// Resource accounting policy for a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountingPolicy {
    /// Proportional-fair accounting.
    Fair,
    /// Greedy, priority-ordered accounting.
    Greedy,
}

/// HARQ status of a scheduling process for one TB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarqStatus {
    /// No outstanding transmission on this process.
    None,
    /// Previous transmission acknowledged.
    Ack,
    /// Previous transmission not acknowledged; retransmission required.
    Nack,
}

/// Transmit power control command carried in a DCI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TpcCommand {
    /// Decrease transmit power by 1 dB.
    Down,
    /// Hold transmit power.
    Hold,
    /// Increase transmit power by 1 dB.
    Up,
}

impl TpcCommand {
    /// The wire encoding used by `remote_scheduler`: 0 = -1 dB, 1 = 0 dB,
    /// 2 = +1 dB.
    pub const fn encode(self) -> u8 {
        match self {
            Self::Down => 0,
            Self::Hold => 1,
            Self::Up => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_set_orthogonal() {
        let a = CapabilitySet::from_caps([Capability::LoPhy, Capability::HiPhy]);
        let b = CapabilitySet::from_caps([Capability::Rrc]);
        assert!(a.is_orthogonal(b));
        assert!(!a.is_orthogonal(a));
    }

    #[test]
    fn capability_set_complete_union() {
        let mut set = CapabilitySet::empty();
        for c in Capability::ALL {
            set.insert(c);
        }
        assert!(set.is_complete());
    }

    #[test]
    fn capability_set_merge() {
        let mut a = CapabilitySet::from_caps([Capability::LoPhy]);
        let b = CapabilitySet::from_caps([Capability::HiPhy]);
        a.merge(b);
        assert!(a.contains(Capability::LoPhy));
        assert!(a.contains(Capability::HiPhy));
    }

    #[test]
    fn tpc_encoding_matches_wire_values() {
        assert_eq!(TpcCommand::Down.encode(), 0);
        assert_eq!(TpcCommand::Hold.encode(), 1);
        assert_eq!(TpcCommand::Up.encode(), 2);
    }
}
