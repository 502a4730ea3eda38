//! `POST /ue_slice_assoc/enb/:id?/auto_assoc`: register a bracketed
//! IMSI-substring policy against a per-direction slice target.
//!
//! Not present verbatim in the reference API surface -- the source's
//! `auto_ue_slice_association` has no registered HTTP route in its own
//! codebase, only the app-layer method this endpoint now exposes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use ranctl_types::SliceId;
use serde::Deserialize;

use super::common::{resolve_bs, DEFAULT_BS_TOKEN};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Either direction left unset means "do not change that direction",
/// the sentinel the source expresses as a negative slice id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAssocRequest {
    policy: String,
    dl_slice_id: Option<u8>,
    ul_slice_id: Option<u8>,
}

async fn autoassoc_core(
    state: Arc<AppState>,
    bs_token: String,
    body: AutoAssocRequest,
) -> Result<StatusCode, ApiError> {
    state
        .autoassoc_rules()
        .register(&body.policy, body.dl_slice_id.map(SliceId), body.ul_slice_id.map(SliceId))?;
    let queue = state.autoassoc_queue().clone();
    state
        .handle()
        .execute(move |rib, _net, _bus| -> Result<(), ApiError> {
            let _bs_id = resolve_bs(rib, &bs_token)?;
            queue.enqueue_all(rib);
            Ok(())
        })
        .await??;
    Ok(StatusCode::OK)
}

/// `POST /ue_slice_assoc/enb/auto_assoc`.
pub async fn autoassoc_default(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<AutoAssocRequest>,
) -> Result<StatusCode, ApiError> {
    autoassoc_core(state, DEFAULT_BS_TOKEN.to_string(), body).await
}

/// `POST /ue_slice_assoc/enb/{id}/auto_assoc`.
pub async fn autoassoc(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AutoAssocRequest>,
) -> Result<StatusCode, ApiError> {
    autoassoc_core(state, id, body).await
}
