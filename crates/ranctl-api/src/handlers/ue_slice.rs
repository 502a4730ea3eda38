//! `POST /ue_slice_assoc/enb/:id` and its single-UE shorthand at
//! `/ue_slice_assoc/enb/:enb_id/ue/:rnti_imsi/slice/:slice_id`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use ranctl_types::SliceId;
use serde::Deserialize;

use super::common::{resolve_bs, DEFAULT_BS_TOKEN};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// One UE entry of the long-form association request: either direction
/// may be omitted to leave that association unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssocEntry {
    rnti_imsi: String,
    dl_slice_id: Option<u8>,
    ul_slice_id: Option<u8>,
}

async fn assoc_core(
    state: Arc<AppState>,
    bs_token: String,
    body: Vec<AssocEntry>,
) -> Result<StatusCode, ApiError> {
    state
        .handle()
        .execute(move |rib, net, _bus| -> Result<(), ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            for entry in &body {
                let rnti = rib.parse_rnti_imsi(bs_id, &entry.rnti_imsi).ok_or_else(|| {
                    ApiError::NotFound(format!("no such ue: {}", entry.rnti_imsi))
                })?;
                ranctl_rrm::ue_slice::associate(
                    rib,
                    net,
                    bs_id,
                    rnti,
                    entry.dl_slice_id.map(SliceId),
                    entry.ul_slice_id.map(SliceId),
                )?;
            }
            Ok(())
        })
        .await??;
    Ok(StatusCode::OK)
}

/// `POST /ue_slice_assoc/enb`.
pub async fn assoc_default(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Vec<AssocEntry>>,
) -> Result<StatusCode, ApiError> {
    assoc_core(state, DEFAULT_BS_TOKEN.to_string(), body).await
}

/// `POST /ue_slice_assoc/enb/{id}`.
pub async fn assoc(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Vec<AssocEntry>>,
) -> Result<StatusCode, ApiError> {
    assoc_core(state, id, body).await
}

/// `POST /ue_slice_assoc/enb/{enb_id}/ue/{rnti_imsi}/slice/{slice_id}`:
/// pin both directions to the same slice in one call.
pub async fn assoc_short(
    State(state): State<Arc<AppState>>,
    Path((enb_id, rnti_imsi, slice_id)): Path<(String, String, u8)>,
) -> Result<StatusCode, ApiError> {
    state
        .handle()
        .execute(move |rib, net, _bus| -> Result<(), ApiError> {
            let bs_id = resolve_bs(rib, &enb_id)?;
            let rnti = rib
                .parse_rnti_imsi(bs_id, &rnti_imsi)
                .ok_or_else(|| ApiError::NotFound(format!("no such ue: {rnti_imsi}")))?;
            ranctl_rrm::ue_slice::associate_short(rib, net, bs_id, rnti, SliceId(slice_id))?;
            Ok(())
        })
        .await??;
    Ok(StatusCode::OK)
}
