//! Shared state handed to every northbound HTTP handler.

use ranctl_rrm::{AutoAssocQueue, AutoAssocRules};
use ranctl_scheduler::SchedulerHandle;

/// The things every handler needs: a handle onto the scheduler thread,
/// plus the shared auto-association rule table and re-evaluation queue
/// (jointly owned with the `rrm-auto-association` tick app) so the
/// registration endpoint can replace rules and requeue connected UEs.
/// Cloning `SchedulerHandle` is cheap (it wraps an `mpsc` sender), but
/// this is still kept behind `Arc` at the router boundary to match the
/// handle-sharing shape used elsewhere in the workspace.
#[derive(Clone)]
pub struct AppState {
    handle: SchedulerHandle,
    autoassoc_rules: AutoAssocRules,
    autoassoc_queue: AutoAssocQueue,
}

impl AppState {
    /// Wrap a scheduler handle and the auto-association shared state for
    /// use as Axum state.
    pub const fn new(
        handle: SchedulerHandle,
        autoassoc_rules: AutoAssocRules,
        autoassoc_queue: AutoAssocQueue,
    ) -> Self {
        Self { handle, autoassoc_rules, autoassoc_queue }
    }

    /// The underlying scheduler handle.
    pub const fn handle(&self) -> &SchedulerHandle {
        &self.handle
    }

    /// The shared auto-association rule table.
    pub const fn autoassoc_rules(&self) -> &AutoAssocRules {
        &self.autoassoc_rules
    }

    /// The shared auto-association re-evaluation queue.
    pub const fn autoassoc_queue(&self) -> &AutoAssocQueue {
        &self.autoassoc_queue
    }
}
