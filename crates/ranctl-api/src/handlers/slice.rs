//! `POST`/`DELETE /slice/enb/:id` and the paired-slice create/remove
//! shorthand at `/slice/enb/:id/slice/:slice_id`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use ranctl_types::SliceId;

use super::common::{primary_cell_id, resolve_bs, DEFAULT_BS_TOKEN};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

async fn apply_core(
    state: Arc<AppState>,
    bs_token: String,
    config: ranctl_types::SliceConfig,
) -> Result<StatusCode, ApiError> {
    state
        .handle()
        .execute(move |rib, net, _bus| -> Result<(), ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            let cell_id = primary_cell_id(rib, bs_id)?;
            ranctl_rrm::slice::apply_slice_config(rib, net, bs_id, cell_id, config)?;
            Ok(())
        })
        .await??;
    Ok(StatusCode::OK)
}

/// `POST /slice/enb`.
pub async fn apply_default(
    State(state): State<Arc<AppState>>,
    ApiJson(config): ApiJson<ranctl_types::SliceConfig>,
) -> Result<StatusCode, ApiError> {
    apply_core(state, DEFAULT_BS_TOKEN.to_string(), config).await
}

/// `POST /slice/enb/{id}`.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(config): ApiJson<ranctl_types::SliceConfig>,
) -> Result<StatusCode, ApiError> {
    apply_core(state, id, config).await
}

async fn create_core(
    state: Arc<AppState>,
    bs_token: String,
    slice_id: u8,
) -> Result<StatusCode, ApiError> {
    state
        .handle()
        .execute(move |rib, net, _bus| -> Result<(), ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            let cell_id = primary_cell_id(rib, bs_id)?;
            ranctl_rrm::slice::create_slice(rib, net, bs_id, cell_id, SliceId(slice_id))?;
            Ok(())
        })
        .await??;
    Ok(StatusCode::OK)
}

/// `POST /slice/enb/{id}/slice/{slice_id}`.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path((id, slice_id)): Path<(String, u8)>,
) -> Result<StatusCode, ApiError> {
    create_core(state, id, slice_id).await
}

async fn remove_one_core(
    state: Arc<AppState>,
    bs_token: String,
    slice_id: u8,
) -> Result<StatusCode, ApiError> {
    state
        .handle()
        .execute(move |rib, net, _bus| -> Result<(), ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            let cell_id = primary_cell_id(rib, bs_id)?;
            ranctl_rrm::slice::remove_slice(rib, net, bs_id, cell_id, SliceId(slice_id))?;
            Ok(())
        })
        .await??;
    Ok(StatusCode::OK)
}

/// `DELETE /slice/enb/{id}/slice/{slice_id}`.
pub async fn remove_one(
    State(state): State<Arc<AppState>>,
    Path((id, slice_id)): Path<(String, u8)>,
) -> Result<StatusCode, ApiError> {
    remove_one_core(state, id, slice_id).await
}

/// Bare `DELETE /slice/enb/:id?` names no `slice_id`, so it is read as
/// "remove every slice but the default" rather than a no-op: every
/// slice but id 0 is dropped from both directions and the resulting
/// configuration is re-applied through the same validation path as a
/// normal slice update.
async fn remove_all_core(state: Arc<AppState>, bs_token: String) -> Result<StatusCode, ApiError> {
    state
        .handle()
        .execute(move |rib, net, _bus| -> Result<(), ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            let cell_id = primary_cell_id(rib, bs_id)?;
            let mut config = rib
                .get_bs(bs_id)
                .and_then(|bs| bs.cells().iter().find(|c| c.cell_id == cell_id))
                .map(|c| c.slice_config.clone())
                .ok_or_else(|| {
                    ApiError::NotFound(format!("base station {bs_id} has no configured carrier"))
                })?;
            config.dl.retain(|s| s.id == SliceId(0));
            config.ul.retain(|s| s.id == SliceId(0));
            ranctl_rrm::slice::replace_slice_config(rib, net, bs_id, cell_id, config)?;
            Ok(())
        })
        .await??;
    Ok(StatusCode::OK)
}

/// `DELETE /slice/enb`.
pub async fn remove_all_default(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    remove_all_core(state, DEFAULT_BS_TOKEN.to_string()).await
}

/// `DELETE /slice/enb/{id}`.
pub async fn remove_all(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_all_core(state, id).await
}
