//! Error type for the MAC scheduler.

/// Failure modes internal to one scheduling pass. These never propagate
/// out of [`crate::MacSchedulerApp::run`]; a scheduling round that hits
/// one of these simply skips the offending BS or UE for this subframe.
#[derive(Debug, thiserror::Error)]
pub enum MacError {
    /// The BS disappeared from the RIB between being listed and being
    /// scheduled.
    #[error("no such base station: {0}")]
    NoSuchBs(ranctl_types::BsId),
    /// Pushing the built `DlMacConfig` to the BS failed.
    #[error(transparent)]
    Rib(#[from] ranctl_rib::RibError),
}
