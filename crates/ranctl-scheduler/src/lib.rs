//! Task manager (C7): the single-threaded cooperative tick loop.
//!
//! Every 1 ms this loop, in order: polls the network interface, drains a
//! bounded batch of RIB-updater messages into the event bus, advances the
//! monotonic tick counter and fires `task_tick` subscribers, runs every
//! registered per-tick app exactly once, and drains commands marshalled
//! in from the northbound API. The RIB, network interface, and event bus
//! are only ever touched from this loop; everything else reaches them
//! through [`SchedulerHandle::execute`], the one synchronization boundary
//! the rest of the workspace is allowed to cross.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ranctl_events::EventBus;
use ranctl_net::NetworkInterface;
use ranctl_rib::{Rib, RibEvent, RibUpdater, DEFAULT_MESSAGE_BUDGET};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// How long an API handler will wait for its command to complete on the
/// scheduler thread before giving up.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure modes of a command sent through a [`SchedulerHandle`].
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The scheduler loop has stopped; no command can be executed.
    #[error("scheduler is no longer running")]
    Closed,
    /// The command did not complete within [`COMMAND_TIMEOUT`].
    #[error("command timed out waiting for the scheduler")]
    Timeout,
}

type BoxedTask = Box<dyn FnOnce(&mut Rib, &NetworkInterface, &mut EventBus) + Send>;

/// A per-tick component the scheduler invokes unconditionally, once per
/// tick, regardless of any `task_tick` subscription (e.g. the MAC
/// scheduler, which must run every subframe rather than on a period).
pub trait TickApp: Send {
    /// Name used in failure logs; apps are isolated from each other so a
    /// panic-free error from one never stops the others running.
    fn name(&self) -> &str;

    /// Run this app's per-tick logic. A returned error is logged and the
    /// tick continues; it never aborts the loop or other apps.
    fn run(
        &mut self,
        rib: &mut Rib,
        net: &NetworkInterface,
        bus: &mut EventBus,
        now_ms: u64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Shared flag observed at tick boundaries to request a clean shutdown.
#[derive(Debug, Default)]
pub struct ShutdownFlag(AtomicBool);

impl ShutdownFlag {
    /// Construct a flag that has not been requested yet.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Request the scheduler loop stop at the next tick boundary.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A cheaply-cloned sender half used by the northbound API (and tests)
/// to marshal work onto the scheduler thread without ever touching the
/// RIB, network interface, or event bus directly.
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: mpsc::Sender<BoxedTask>,
}

impl SchedulerHandle {
    /// Run `f` on the scheduler thread and return its result.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Closed`] if the scheduler has stopped,
    /// or [`SchedulerError::Timeout`] if it does not reply within
    /// [`COMMAND_TIMEOUT`].
    pub async fn execute<F, R>(&self, f: F) -> Result<R, SchedulerError>
    where
        F: FnOnce(&mut Rib, &NetworkInterface, &mut EventBus) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let task: BoxedTask = Box::new(move |rib, net, bus| {
            let _ = reply_tx.send(f(rib, net, bus));
        });
        self.commands.send(task).await.map_err(|_| SchedulerError::Closed)?;
        match tokio::time::timeout(COMMAND_TIMEOUT, reply_rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(SchedulerError::Closed),
            Err(_) => Err(SchedulerError::Timeout),
        }
    }
}

/// Outcome of a bounded [`Scheduler::run`] call.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerSummary {
    /// How many ticks actually ran.
    pub ticks_run: u64,
    /// The monotonic tick counter's value when the loop stopped.
    pub final_counter_ms: u64,
}

/// Owns the RIB, the network interface, the event bus, and the set of
/// per-tick apps, and drives them all from a single 1 ms loop.
pub struct Scheduler {
    rib: Rib,
    net: NetworkInterface,
    bus: EventBus,
    updater: RibUpdater,
    apps: Vec<Box<dyn TickApp>>,
    message_budget: usize,
    counter_ms: u64,
    commands_tx: mpsc::Sender<BoxedTask>,
    commands_rx: mpsc::Receiver<BoxedTask>,
}

impl Scheduler {
    /// Construct a scheduler around an already-bound network interface.
    /// `command_queue_depth` bounds how many API commands can be
    /// in flight before `SchedulerHandle::execute` itself starts to wait.
    pub fn new(rib: Rib, net: NetworkInterface, command_queue_depth: usize) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(command_queue_depth);
        Self {
            rib,
            net,
            bus: EventBus::new(),
            updater: RibUpdater::new(),
            apps: Vec::new(),
            message_budget: DEFAULT_MESSAGE_BUDGET,
            counter_ms: 0,
            commands_tx,
            commands_rx,
        }
    }

    /// A handle API handlers can clone and send across threads.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle { commands: self.commands_tx.clone() }
    }

    /// Register a per-tick app. Apps run in registration order, after
    /// `task_tick` subscribers have fired for this tick.
    pub fn register_app(&mut self, app: Box<dyn TickApp>) {
        self.apps.push(app);
    }

    /// Direct access to the event bus, for wiring up subscriptions
    /// before the loop starts running.
    pub fn event_bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// The tick counter's current value.
    pub const fn counter_ms(&self) -> u64 {
        self.counter_ms
    }

    /// Run the tick loop until `shutdown` is requested, observed at each
    /// tick boundary.
    pub async fn run(&mut self, shutdown: &ShutdownFlag) -> SchedulerSummary {
        let mut interval = tokio::time::interval(Duration::from_millis(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut ticks_run: u64 = 0;
        loop {
            interval.tick().await;
            if shutdown.is_requested() {
                break;
            }
            self.run_one_tick().await;
            ticks_run = ticks_run.saturating_add(1);
        }
        SchedulerSummary { ticks_run, final_counter_ms: self.counter_ms }
    }

    async fn run_one_tick(&mut self) {
        let started = Instant::now();

        let events = self.net.poll(Duration::from_millis(0)).await;
        self.updater.push_events(events);
        let rib_events =
            self.updater.drain(&mut self.rib, &self.net, self.counter_ms, self.message_budget);
        for event in rib_events {
            publish(&mut self.bus, event);
        }

        self.counter_ms = self.counter_ms.wrapping_add(1);
        self.bus.publish_tick(self.counter_ms);

        for app in &mut self.apps {
            if let Err(e) = app.run(&mut self.rib, &self.net, &mut self.bus, self.counter_ms) {
                tracing::error!(app = app.name(), error = %e, "tick app failed, continuing");
            }
        }

        self.updater.enforce_handshake_timeout(&mut self.rib, &mut self.net, self.counter_ms);
        for bs_id in self.rib.scan_inactive(self.counter_ms) {
            tracing::warn!(%bs_id, "base station crossed inactivity threshold");
        }

        while let Ok(task) = self.commands_rx.try_recv() {
            task(&mut self.rib, &self.net, &mut self.bus);
        }

        let elapsed = started.elapsed();
        if elapsed > Duration::from_millis(1) {
            tracing::warn!(elapsed_us = elapsed.as_micros(), "tick overran its 1 ms budget");
        }
    }
}

fn publish(bus: &mut EventBus, event: RibEvent) {
    match event {
        RibEvent::BsAdd(bs_id) => bus.publish_bs_add(bs_id),
        RibEvent::BsRemove(bs_id) => bus.publish_bs_remove(bs_id),
        RibEvent::UeConnect(bs_id, rnti) => bus.publish_ue_connect(bs_id, rnti),
        RibEvent::UeUpdate(bs_id, rnti) => bus.publish_ue_update(bs_id, rnti),
        RibEvent::UeDisconnect(bs_id, rnti) => bus.publish_ue_disconnect(bs_id, rnti),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use ranctl_types::BsId;

    use super::{Scheduler, ShutdownFlag};
    use crate::TickApp;

    struct CountingApp {
        calls: Arc<AtomicU64>,
    }

    impl TickApp for CountingApp {
        fn name(&self) -> &str {
            "counting-app"
        }

        fn run(
            &mut self,
            _rib: &mut ranctl_rib::Rib,
            _net: &ranctl_net::NetworkInterface,
            _bus: &mut ranctl_events::EventBus,
            _now_ms: u64,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    async fn bound_scheduler() -> Option<Scheduler> {
        let net = ranctl_net::NetworkInterface::bind("127.0.0.1:0", 8).await.ok()?;
        Some(Scheduler::new(ranctl_rib::Rib::new(), net, 8))
    }

    #[tokio::test]
    async fn registered_apps_run_every_tick() {
        let Some(mut scheduler) = bound_scheduler().await else {
            return assert!(false, "bind failed");
        };
        let calls = Arc::new(AtomicU64::new(0));
        scheduler.register_app(Box::new(CountingApp { calls: Arc::clone(&calls) }));

        let shutdown = Arc::new(ShutdownFlag::new());
        let shutdown_for_run = Arc::clone(&shutdown);
        let driver = tokio::spawn(async move { scheduler.run(shutdown_for_run.as_ref()).await });

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        shutdown.request();
        let Ok(summary) = driver.await else {
            return assert!(false, "scheduler task panicked");
        };
        assert!(summary.ticks_run > 0);
        assert!(calls.load(Ordering::Relaxed) > 0);
    }

    #[tokio::test]
    async fn command_executes_against_live_rib() {
        let Some(mut scheduler) = bound_scheduler().await else {
            return assert!(false, "bind failed");
        };
        let handle = scheduler.handle();
        let shutdown = Arc::new(ShutdownFlag::new());
        let shutdown_for_run = Arc::clone(&shutdown);
        let driver = tokio::spawn(async move { scheduler.run(shutdown_for_run.as_ref()).await });

        let has_bs = handle.execute(|rib, _net, _bus| rib.has_bs(BsId(1))).await;
        assert_eq!(has_bs.unwrap_or(true), false);

        shutdown.request();
        let _ = driver.await;
    }
}
