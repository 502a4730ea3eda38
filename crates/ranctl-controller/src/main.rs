//! Controller binary.
//!
//! Startup sequence: initialize structured logging, load configuration,
//! bind the agent-facing TCP listener, construct the RIB-owning
//! scheduler, register the auto-association and remote-MAC-scheduler
//! tick apps, wire their event-bus subscriptions, spawn the tick loop,
//! and finally start the northbound HTTP API against a handle onto that
//! loop.

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use ranctl_api::{AppState, ServerConfig};
use ranctl_mac::MacSchedulerApp;
use ranctl_net::NetworkInterface;
use ranctl_rib::Rib;
use ranctl_rrm::{AutoAssocQueue, AutoAssocRules, AutoAssociationApp};
use ranctl_scheduler::{Scheduler, ShutdownFlag};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ControllerConfig;
use crate::error::ControllerError;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("ranctl-controller starting");

    let config = ControllerConfig::load(Path::new("ranctl-controller.yaml"))?;
    info!(
        bind_addr = config.network.bind_addr,
        api_host = config.api.host,
        api_port = config.api.port,
        "configuration loaded"
    );

    let net = NetworkInterface::bind(&config.network.bind_addr, config.network.send_queue_capacity)
        .await?;
    info!(addr = config.network.bind_addr, "agent-facing TCP listener bound");

    let mut scheduler = Scheduler::new(Rib::new(), net, config.scheduler.command_queue_depth);

    let autoassoc_queue = AutoAssocQueue::new();
    let autoassoc_rules = AutoAssocRules::new();
    scheduler.register_app(Box::new(AutoAssociationApp::new(
        autoassoc_queue.clone(),
        autoassoc_rules.clone(),
    )));
    scheduler.register_app(Box::new(MacSchedulerApp::new()));

    let bus = scheduler.event_bus_mut();
    bus.subscribe_ue_connect(autoassoc_queue.subscriber());
    bus.subscribe_ue_update(autoassoc_queue.subscriber());

    let handle = scheduler.handle();
    let shutdown = Arc::new(ShutdownFlag::new());
    let shutdown_for_tick = Arc::clone(&shutdown);
    let tick_loop = tokio::spawn(async move {
        let summary = scheduler.run(shutdown_for_tick.as_ref()).await;
        info!(ticks_run = summary.ticks_run, "tick loop stopped");
    });

    let shutdown_for_signal = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            shutdown_for_signal.request();
        }
    });

    let state = Arc::new(AppState::new(handle, autoassoc_rules, autoassoc_queue));
    let server_config = ServerConfig { host: config.api.host, port: config.api.port };
    info!(host = server_config.host, port = server_config.port, "northbound API starting");
    let server_result = ranctl_api::start_server(&server_config, state).await;

    shutdown.request();
    let _ = tick_loop.await;

    server_result?;
    info!("ranctl-controller shutdown complete");
    Ok(())
}
