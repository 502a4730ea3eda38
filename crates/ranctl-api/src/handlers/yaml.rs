//! `POST /yaml/:id?`: forward a raw YAML document to an agent,
//! bypassing the typed reconfiguration endpoints entirely.
//!
//! Deprecated, internal-test compatibility only -- mirrors the source
//! system's `yaml_compat` handler, which the original API surface marks
//! as "might be dysfunctional or make the agent break" and scheduled
//! for removal. The controller validates only that the body parses as
//! YAML at all; it never interprets its contents.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use ranctl_types::ControlMessage;

use super::common::{resolve_bs, DEFAULT_BS_TOKEN};
use crate::error::ApiError;
use crate::state::AppState;

async fn passthrough_core(
    state: Arc<AppState>,
    bs_token: String,
    yaml: String,
) -> Result<StatusCode, ApiError> {
    serde_yml::from_str::<serde_yml::Value>(&yaml).map_err(|e| ApiError::Parse(e.to_string()))?;
    state
        .handle()
        .execute(move |rib, net, _bus| -> Result<(), ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            ranctl_rib::send_message(rib, net, bs_id, ControlMessage::YamlConfig { yaml })?;
            Ok(())
        })
        .await??;
    Ok(StatusCode::OK)
}

/// `POST /yaml`.
pub async fn passthrough_default(
    State(state): State<Arc<AppState>>,
    yaml: String,
) -> Result<StatusCode, ApiError> {
    passthrough_core(state, DEFAULT_BS_TOKEN.to_string(), yaml).await
}

/// `POST /yaml/{id}`.
pub async fn passthrough(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    yaml: String,
) -> Result<StatusCode, ApiError> {
    passthrough_core(state, id, yaml).await
}
