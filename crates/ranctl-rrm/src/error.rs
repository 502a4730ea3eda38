//! Error types for RRM operations.

use ranctl_types::{BsId, SliceAlgorithm, SliceId};

/// Failure modes surfaced by slice, UE-association, and cell-restart
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum RrmError {
    /// Propagated from a RIB lookup or update.
    #[error(transparent)]
    Rib(#[from] ranctl_rib::RibError),
    /// `cell_id` is not one of `bs_id`'s reported carriers.
    #[error("base station {0} has no carrier {1}")]
    NoSuchCell(BsId, u16),
    /// A slice id was referenced that does not exist in the current
    /// configuration.
    #[error("no such slice: {0}")]
    NoSuchSlice(SliceId),
    /// The requested algorithm change has no defined migration path.
    #[error("cannot change slicing algorithm from {from:?} to {to:?}")]
    UnsupportedTransform {
        /// Algorithm currently in effect.
        from: SliceAlgorithm,
        /// Algorithm requested.
        to: SliceAlgorithm,
    },
    /// A request failed validation for a reason specific to the field(s)
    /// involved; the message matches the rejection this implementation
    /// documents for that field.
    #[error("{0}")]
    InvalidArgument(String),
}
