//! Integration tests for the northbound API: exercise the real router
//! via `tower::ServiceExt` against a scheduler running a live RIB, with
//! no TCP listener involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ranctl_api::{build_router, AppState};
use ranctl_net::NetworkInterface;
use ranctl_rib::Rib;
use ranctl_rrm::{AutoAssocQueue, AutoAssocRules};
use ranctl_scheduler::{Scheduler, SchedulerHandle, ShutdownFlag};
use ranctl_types::{
    AgentId, BsId, Capability, CapabilitySet, CellConfig, SliceAlgorithm, SliceConfig,
};
use serde_json::Value;
use tower::ServiceExt;

const TEST_BS: BsId = BsId(42);

fn test_cell() -> CellConfig {
    CellConfig {
        phy_cell_id: 1,
        cell_id: 0,
        dl_bandwidth: 25,
        ul_bandwidth: 25,
        dl_freq: 1_850,
        ul_freq: 1_750,
        eutra_band: 3,
        dl_pdsch_power: -3,
        ul_pusch_power: -3,
        slice_config: SliceConfig { algorithm: SliceAlgorithm::None, ..SliceConfig::default() },
        raw_extra: Value::Null,
    }
}

/// Boot a scheduler on a live loopback socket, run it in the
/// background, register one fully-handshaken BS with a single cell, and
/// hand back the router built against its handle.
async fn test_router() -> Option<axum::Router> {
    let net = NetworkInterface::bind("127.0.0.1:0", 8).await.ok()?;
    let mut scheduler = Scheduler::new(Rib::new(), net, 8);
    let handle: SchedulerHandle = scheduler.handle();

    let shutdown = Arc::new(ShutdownFlag::new());
    let shutdown_for_run = Arc::clone(&shutdown);
    tokio::spawn(async move {
        scheduler.run(shutdown_for_run.as_ref()).await;
    });

    handle
        .execute(|rib, _net, _bus| {
            rib.add_pending_agent(AgentId(1), 0);
            rib.record_hello(AgentId(1), TEST_BS).ok();
            rib.register_capabilities(AgentId(1), CapabilitySet::from_caps([Capability::Rrc]), 0)
                .ok();
            rib.update_enb_config(TEST_BS, vec![test_cell()]).ok();
        })
        .await
        .ok()?;

    let state = Arc::new(AppState::new(handle, AutoAssocRules::new(), AutoAssocQueue::new()));
    Some(build_router(state))
}

async fn body_json(body: Body) -> Option<Value> {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[tokio::test]
async fn stats_for_registered_bs_returns_ok() {
    let Some(router) = test_router().await else {
        return assert!(false, "failed to stand up test router");
    };
    let Ok(request) = Request::get("/stats/enb/42").body(Body::empty()) else {
        return assert!(false, "failed to build request");
    };
    let Ok(response) = router.oneshot(request).await else {
        return assert!(false, "router returned an error");
    };
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn stats_for_unknown_bs_is_not_found() {
    let Some(router) = test_router().await else {
        return assert!(false, "failed to stand up test router");
    };
    let Ok(request) = Request::get("/stats/enb/9999").body(Body::empty()) else {
        return assert!(false, "failed to build request");
    };
    let Ok(response) = router.oneshot(request).await else {
        return assert!(false, "router returned an error");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn slice_apply_with_invalid_body_rejects_as_bad_request() {
    let Some(router) = test_router().await else {
        return assert!(false, "failed to stand up test router");
    };
    let Ok(request) = Request::post("/slice/enb/42")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
    else {
        return assert!(false, "failed to build request");
    };
    let Ok(response) = router.oneshot(request).await else {
        return assert!(false, "router returned an error");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn slice_apply_with_valid_body_succeeds() {
    let Some(router) = test_router().await else {
        return assert!(false, "failed to stand up test router");
    };
    let config = SliceConfig { algorithm: SliceAlgorithm::None, ..SliceConfig::default() };
    let Ok(payload) = serde_json::to_string(&config) else {
        return assert!(false, "failed to encode body");
    };
    let Ok(request) = Request::post("/slice/enb/42")
        .header("content-type", "application/json")
        .body(Body::from(payload))
    else {
        return assert!(false, "failed to build request");
    };
    let Ok(response) = router.oneshot(request).await else {
        return assert!(false, "router returned an error");
    };
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn ue_slice_assoc_for_unknown_ue_is_not_found() {
    let Some(router) = test_router().await else {
        return assert!(false, "failed to stand up test router");
    };
    let Ok(request) = Request::post("/ue_slice_assoc/enb/42")
        .header("content-type", "application/json")
        .body(Body::from(r#"[{"rntiImsi":"10","dlSliceId":0}]"#))
    else {
        return assert!(false, "failed to build request");
    };
    let Ok(response) = router.oneshot(request).await else {
        return assert!(false, "router returned an error");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn yaml_passthrough_rejects_non_yaml_body() {
    let Some(router) = test_router().await else {
        return assert!(false, "failed to stand up test router");
    };
    let Ok(request) = Request::post("/yaml/42").body(Body::from("{not: [valid")) else {
        return assert!(false, "failed to build request");
    };
    let Ok(response) = router.oneshot(request).await else {
        return assert!(false, "router returned an error");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn conf_get_default_reflects_the_most_recently_registered_bs() {
    let Some(router) = test_router().await else {
        return assert!(false, "failed to stand up test router");
    };
    let Ok(request) = Request::get("/stats/conf/enb").body(Body::empty()) else {
        return assert!(false, "failed to build request");
    };
    let Ok(response) = router.oneshot(request).await else {
        return assert!(false, "router returned an error");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let Some(json) = body_json(response.into_body()).await else {
        return assert!(false, "response body was not JSON");
    };
    assert!(json.is_array() || json.is_object());
}
