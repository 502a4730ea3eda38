//! `GET /stats`, `GET /stats/enb/:id`, `GET /stats/ue/:id`, and
//! `GET`/`POST /stats/conf/enb/:id` -- configuration and MAC-statistics
//! snapshots, and the stats-reporting subscription.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use ranctl_rib::BsRecord;
use ranctl_types::{BsId, CellConfig, MacStats, Rnti, StatsRequestConfig, UeConfig};
use serde::Serialize;

use super::common::{resolve_bs, DEFAULT_BS_TOKEN};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Clone, Copy)]
enum StatsKind {
    EnbConfig,
    MacStats,
    All,
}

impl StatsKind {
    fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw {
            None | Some("all") => Ok(Self::All),
            Some("enb_config") => Ok(Self::EnbConfig),
            Some("mac_stats") => Ok(Self::MacStats),
            Some(other) => Err(ApiError::Parse(format!("unknown stats kind: {other}"))),
        }
    }
}

/// One base station's requested slice of its configuration/statistics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BsStats {
    bs_id: BsId,
    #[serde(skip_serializing_if = "Option::is_none")]
    enb_config: Option<Vec<CellConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mac_stats: Option<Vec<MacStats>>,
}

fn snapshot(bs: &BsRecord, kind: StatsKind) -> BsStats {
    let enb_config =
        matches!(kind, StatsKind::EnbConfig | StatsKind::All).then(|| bs.cells().to_vec());
    let mac_stats = matches!(kind, StatsKind::MacStats | StatsKind::All)
        .then(|| bs.all_mac_stats().cloned().collect());
    BsStats { bs_id: bs.bs_id(), enb_config, mac_stats }
}

async fn all_core(state: Arc<AppState>, kind: Option<String>) -> Result<Json<Vec<BsStats>>, ApiError> {
    let kind = StatsKind::parse(kind.as_deref())?;
    let snapshots = state
        .handle()
        .execute(move |rib, _net, _bus| {
            let ids: Vec<BsId> = rib.available_bs().collect();
            ids.iter().filter_map(|id| rib.get_bs(*id)).map(|bs| snapshot(bs, kind)).collect()
        })
        .await?;
    Ok(Json(snapshots))
}

/// `GET /stats`.
pub async fn all_default(State(state): State<Arc<AppState>>) -> Result<Json<Vec<BsStats>>, ApiError> {
    all_core(state, None).await
}

/// `GET /stats/{kind}`.
pub async fn all_typed(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<BsStats>>, ApiError> {
    all_core(state, Some(kind)).await
}

async fn one_core(
    state: Arc<AppState>,
    bs_token: String,
    kind: Option<String>,
) -> Result<Json<BsStats>, ApiError> {
    let kind = StatsKind::parse(kind.as_deref())?;
    let snapshot = state
        .handle()
        .execute(move |rib, _net, _bus| -> Result<BsStats, ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            let bs = rib
                .get_bs(bs_id)
                .ok_or_else(|| ApiError::NotFound(format!("no such base station: {bs_id}")))?;
            Ok(snapshot(bs, kind))
        })
        .await??;
    Ok(Json(snapshot))
}

/// `GET /stats/enb/{id}`.
pub async fn one_default(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BsStats>, ApiError> {
    one_core(state, id, None).await
}

/// `GET /stats/enb/{id}/{kind}`.
pub async fn one_typed(
    State(state): State<Arc<AppState>>,
    Path((id, kind)): Path<(String, String)>,
) -> Result<Json<BsStats>, ApiError> {
    one_core(state, id, Some(kind)).await
}

/// Configuration and latest MAC statistics for a single UE.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UeStats {
    rnti: Rnti,
    ue: UeConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    mac_stats: Option<MacStats>,
}

async fn ue_core(
    state: Arc<AppState>,
    bs_token: String,
    ue_token: String,
) -> Result<Json<UeStats>, ApiError> {
    let stats = state
        .handle()
        .execute(move |rib, _net, _bus| -> Result<UeStats, ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            let rnti = rib
                .parse_rnti_imsi(bs_id, &ue_token)
                .ok_or_else(|| ApiError::NotFound(format!("no such ue: {ue_token}")))?;
            let bs = rib
                .get_bs(bs_id)
                .ok_or_else(|| ApiError::NotFound(format!("no such base station: {bs_id}")))?;
            let ue = bs
                .ue(rnti)
                .copied()
                .ok_or_else(|| ApiError::NotFound(format!("no such ue: {rnti}")))?;
            let mac_stats = bs.mac_stats_for(rnti).cloned();
            Ok(UeStats { rnti, ue, mac_stats })
        })
        .await??;
    Ok(Json(stats))
}

/// `GET /stats/ue/{id_ue}`, scoped to the most recently registered BS.
pub async fn ue_default(
    State(state): State<Arc<AppState>>,
    Path(id_ue): Path<String>,
) -> Result<Json<UeStats>, ApiError> {
    ue_core(state, DEFAULT_BS_TOKEN.to_string(), id_ue).await
}

/// `GET /stats/enb/{id_enb}/ue/{id_ue}`.
pub async fn ue_scoped(
    State(state): State<Arc<AppState>>,
    Path((id_enb, id_ue)): Path<(String, String)>,
) -> Result<Json<UeStats>, ApiError> {
    ue_core(state, id_enb, id_ue).await
}

async fn conf_get_core(
    state: Arc<AppState>,
    bs_token: String,
) -> Result<Json<StatsRequestConfig>, ApiError> {
    let cfg = state
        .handle()
        .execute(move |rib, _net, _bus| -> Result<StatsRequestConfig, ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            let bs = rib
                .get_bs(bs_id)
                .ok_or_else(|| ApiError::NotFound(format!("no such base station: {bs_id}")))?;
            Ok(bs.stats_request())
        })
        .await??;
    Ok(Json(cfg))
}

/// `GET /stats/conf/enb`.
pub async fn conf_get_default(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsRequestConfig>, ApiError> {
    conf_get_core(state, DEFAULT_BS_TOKEN.to_string()).await
}

/// `GET /stats/conf/enb/{id}`.
pub async fn conf_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatsRequestConfig>, ApiError> {
    conf_get_core(state, id).await
}

async fn conf_set_core(
    state: Arc<AppState>,
    bs_token: String,
    config: StatsRequestConfig,
) -> Result<Json<StatsRequestConfig>, ApiError> {
    let cfg = state
        .handle()
        .execute(move |rib, net, _bus| -> Result<StatsRequestConfig, ApiError> {
            let bs_id = resolve_bs(rib, &bs_token)?;
            rib.set_stats_request(bs_id, config)?;
            ranctl_rib::send_message(
                rib,
                net,
                bs_id,
                ranctl_types::ControlMessage::StatsRequest { config },
            )?;
            Ok(config)
        })
        .await??;
    Ok(Json(cfg))
}

/// `POST /stats/conf/enb`.
pub async fn conf_set_default(
    State(state): State<Arc<AppState>>,
    ApiJson(config): ApiJson<StatsRequestConfig>,
) -> Result<Json<StatsRequestConfig>, ApiError> {
    conf_set_core(state, DEFAULT_BS_TOKEN.to_string(), config).await
}

/// `POST /stats/conf/enb/{id}`.
pub async fn conf_set(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(config): ApiJson<StatsRequestConfig>,
) -> Result<Json<StatsRequestConfig>, ApiError> {
    conf_set_core(state, id, config).await
}
