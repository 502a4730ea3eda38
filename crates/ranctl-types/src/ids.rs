//! Strongly-typed identifiers to prevent mixing agent ids, BS ids, RNTIs
//! and IMSIs at compile time.

use serde::{Deserialize, Serialize};

/// Controller-assigned, monotonically increasing identifier for one
/// TCP-connected agent process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Base-station identifier as reported by an agent during handshake
/// (the eNB id). Several agents may share one `BsId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BsId(pub u64);

impl core::fmt::Display for BsId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 16-bit radio-network temporary identifier, unique per BS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rnti(pub u16);

impl core::fmt::Display for Rnti {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable subscriber identifier, independent of RNTI reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Imsi(pub u64);

impl core::fmt::Display for Imsi {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a slice, unique within one direction (DL or UL) on one BS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SliceId(pub u8);

impl core::fmt::Display for SliceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let agent = AgentId(1);
        let bs = BsId(1);
        assert_eq!(agent.0, 1);
        assert_eq!(bs.0, 1);
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = Rnti(10337);
        let json = serde_json::to_string(&original).unwrap_or_default();
        let restored: Rnti = serde_json::from_str(&json).unwrap_or(Rnti(0));
        assert_eq!(restored, original);
    }

    #[test]
    fn id_display() {
        assert_eq!(BsId(234_881_024).to_string(), "234881024");
        assert_eq!(SliceId(3).to_string(), "3");
    }
}
