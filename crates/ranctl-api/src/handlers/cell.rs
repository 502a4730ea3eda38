//! `POST /conf/enb/:id` -- cell restart.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use ranctl_rrm::CellRestartRequest;

use super::common::{primary_cell_id, resolve_bs, DEFAULT_BS_TOKEN};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

async fn restart_core(
    state: Arc<AppState>,
    bs_token: String,
    req: CellRestartRequest,
) -> Result<StatusCode, ApiError> {
    state
        .handle()
        .execute(move |rib, net, _bus| -> Result<(), ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            let cell_id = primary_cell_id(rib, bs_id)?;
            ranctl_rrm::cell::restart(rib, net, bs_id, cell_id, &req)?;
            Ok(())
        })
        .await??;
    Ok(StatusCode::OK)
}

/// `POST /conf/enb`.
pub async fn restart_default(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CellRestartRequest>,
) -> Result<StatusCode, ApiError> {
    restart_core(state, DEFAULT_BS_TOKEN.to_string(), req).await
}

/// `POST /conf/enb/{id}`.
pub async fn restart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CellRestartRequest>,
) -> Result<StatusCode, ApiError> {
    restart_core(state, id, req).await
}
