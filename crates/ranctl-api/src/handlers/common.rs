//! Shared helpers used across the handler modules.

use ranctl_rib::Rib;
use ranctl_types::BsId;

use crate::error::ApiError;

/// Token a bare `:id?` route segment resolves to when the caller omits
/// it, matching [`Rib::parse_bs_id`]'s own "last added" sentinel.
pub(crate) const DEFAULT_BS_TOKEN: &str = "-1";

pub(crate) fn resolve_bs(rib: &Rib, token: &str) -> Result<BsId, ApiError> {
    rib.parse_bs_id(token)
        .ok_or_else(|| ApiError::NotFound(format!("no such base station: {token}")))
}

/// The cell a handler should act on when the route carries only a BS
/// id. No endpoint in the external interface names a carrier
/// explicitly, so every single-BS operation targets its first reported
/// cell, the same choice already made by `ue_slice::associate`.
pub(crate) fn primary_cell_id(rib: &Rib, bs_id: BsId) -> Result<u16, ApiError> {
    rib.get_bs(bs_id)
        .and_then(|bs| bs.cells().first())
        .map(|c| c.cell_id)
        .ok_or_else(|| ApiError::NotFound(format!("base station {bs_id} has no configured carrier")))
}
