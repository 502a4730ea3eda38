//! Axum router construction for the northbound API.
//!
//! Every route named in the external interface is registered twice
//! where it carries an optional `:id?` segment: once bare (resolving to
//! the most recently registered BS) and once with the segment present.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{autoassoc, cell, slice, stats, ue_slice, yaml};
use crate::state::AppState;

/// Build the complete router. `state` is shared across every handler
/// via `axum::extract::State`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/stats", get(stats::all_default))
        .route("/stats/{kind}", get(stats::all_typed))
        .route("/stats/enb/{id}", get(stats::one_default))
        .route("/stats/enb/{id}/{kind}", get(stats::one_typed))
        .route("/stats/ue/{id_ue}", get(stats::ue_default))
        .route("/stats/enb/{id_enb}/ue/{id_ue}", get(stats::ue_scoped))
        .route(
            "/stats/conf/enb",
            get(stats::conf_get_default).post(stats::conf_set_default),
        )
        .route("/stats/conf/enb/{id}", get(stats::conf_get).post(stats::conf_set))
        .route("/slice/enb", post(slice::apply_default).delete(slice::remove_all_default))
        .route("/slice/enb/{id}", post(slice::apply).delete(slice::remove_all))
        .route("/slice/enb/{id}/slice/{slice_id}", post(slice::create).delete(slice::remove_one))
        .route("/ue_slice_assoc/enb", post(ue_slice::assoc_default))
        .route("/ue_slice_assoc/enb/{id}", post(ue_slice::assoc))
        .route(
            "/ue_slice_assoc/enb/{enb_id}/ue/{rnti_imsi}/slice/{slice_id}",
            post(ue_slice::assoc_short),
        )
        .route("/ue_slice_assoc/enb/auto_assoc", post(autoassoc::autoassoc_default))
        .route("/ue_slice_assoc/enb/{id}/auto_assoc", post(autoassoc::autoassoc))
        .route("/conf/enb", post(cell::restart_default))
        .route("/conf/enb/{id}", post(cell::restart))
        .route("/yaml", post(yaml::passthrough_default))
        .route("/yaml/{id}", post(yaml::passthrough))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
