//! Synchronous event bus for the control plane (C6).
//!
//! The bus lives on the scheduler thread only: publishing an event runs
//! every matching subscriber's callback inline, in registration order,
//! before `publish_*` returns. There is no queueing and no cross-thread
//! delivery -- RIB mutations triggered from a callback are safe precisely
//! because nothing else can be touching the RIB at the same time.
//!
//! Subscriptions are revocable via the handle returned from `subscribe_*`.
//! `unsubscribe` marks the entry cancelled immediately -- it is never
//! dispatched again, including later in an in-flight round -- but the
//! backing storage for that event kind is only compacted once the
//! current `publish_*` call returns, so a cancellation never shifts or
//! invalidates the index the dispatch loop is partway through.

use ranctl_types::{BsId, Rnti};

/// Handle returned by a `subscribe_*` call. Pass it to [`EventBus::unsubscribe`]
/// to stop receiving that event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Entry<F> {
    id: SubscriptionId,
    cancelled: bool,
    callback: F,
}

struct Subscribers<F> {
    entries: Vec<Entry<F>>,
}

impl<F> Subscribers<F> {
    const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn push(&mut self, id: SubscriptionId, callback: F) {
        self.entries.push(Entry { id, cancelled: false, callback });
    }

    fn cancel(&mut self, id: SubscriptionId) -> bool {
        for entry in &mut self.entries {
            if entry.id == id {
                entry.cancelled = true;
                return true;
            }
        }
        false
    }

    fn compact(&mut self) {
        self.entries.retain(|e| !e.cancelled);
    }
}

/// A tick callback: the elapsed scheduler time in milliseconds.
type TickCallback = Box<dyn FnMut(u64) + Send>;
/// A UE-event callback: the owning base station and the UE's RNTI.
type UeCallback = Box<dyn FnMut(BsId, Rnti) + Send>;
/// A base-station-event callback.
type BsCallback = Box<dyn FnMut(BsId) + Send>;

struct TickEntry {
    period_ms: u64,
    offset_ms: u64,
    callback: TickCallback,
}

/// Typed, registration-ordered publish-subscribe registry.
///
/// One instance is owned by the scheduler; the RIB updater, RRM app, and
/// MAC scheduler all subscribe to the kinds they care about during
/// startup.
pub struct EventBus {
    next_id: u64,
    dispatching: bool,
    tick: Subscribers<TickEntry>,
    ue_connect: Subscribers<UeCallback>,
    ue_update: Subscribers<UeCallback>,
    ue_disconnect: Subscribers<UeCallback>,
    bs_add: Subscribers<BsCallback>,
    bs_remove: Subscribers<BsCallback>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Construct an empty bus with no subscribers.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            dispatching: false,
            tick: Subscribers::new(),
            ue_connect: Subscribers::new(),
            ue_update: Subscribers::new(),
            ue_disconnect: Subscribers::new(),
            bs_add: Subscribers::new(),
            bs_remove: Subscribers::new(),
        }
    }

    fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Subscribe a callback to fire every time `counter_ms % period_ms ==
    /// offset_ms % period_ms`, where `counter_ms` is the scheduler's
    /// monotonic tick counter. A `period_ms` of zero never fires.
    pub fn subscribe_tick(
        &mut self,
        period_ms: u64,
        offset_ms: u64,
        callback: impl FnMut(u64) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.tick.push(id, TickEntry { period_ms, offset_ms, callback: Box::new(callback) });
        id
    }

    /// Subscribe to UE-connect notifications.
    pub fn subscribe_ue_connect(
        &mut self,
        callback: impl FnMut(BsId, Rnti) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.ue_connect.push(id, Box::new(callback));
        id
    }

    /// Subscribe to UE-update notifications (RNTI reassignment, LC change).
    pub fn subscribe_ue_update(
        &mut self,
        callback: impl FnMut(BsId, Rnti) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.ue_update.push(id, Box::new(callback));
        id
    }

    /// Subscribe to UE-disconnect notifications.
    pub fn subscribe_ue_disconnect(
        &mut self,
        callback: impl FnMut(BsId, Rnti) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.ue_disconnect.push(id, Box::new(callback));
        id
    }

    /// Subscribe to base-station-added notifications.
    pub fn subscribe_bs_add(
        &mut self,
        callback: impl FnMut(BsId) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.bs_add.push(id, Box::new(callback));
        id
    }

    /// Subscribe to base-station-removed notifications.
    pub fn subscribe_bs_remove(
        &mut self,
        callback: impl FnMut(BsId) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.bs_remove.push(id, Box::new(callback));
        id
    }

    /// Revoke a subscription. Returns `false` if `id` is unknown (already
    /// revoked, or never issued by this bus).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.tick.cancel(id)
            || self.ue_connect.cancel(id)
            || self.ue_update.cancel(id)
            || self.ue_disconnect.cancel(id)
            || self.bs_add.cancel(id)
            || self.bs_remove.cancel(id)
    }

    /// Advance the tick counter to `counter_ms`, firing every tick
    /// subscription whose period divides evenly into `counter_ms - offset`.
    pub fn publish_tick(&mut self, counter_ms: u64) {
        self.dispatching = true;
        for entry in &mut self.tick.entries {
            if entry.cancelled || entry.period_ms == 0 {
                continue;
            }
            let phase = counter_ms.wrapping_sub(entry.offset_ms) % entry.period_ms;
            if phase == 0 {
                (entry.callback)(counter_ms);
            }
        }
        self.dispatching = false;
        self.tick.compact();
    }

    /// Notify `ue_connect` subscribers.
    pub fn publish_ue_connect(&mut self, bs_id: BsId, rnti: Rnti) {
        self.dispatching = true;
        for entry in &mut self.ue_connect.entries {
            if !entry.cancelled {
                (entry.callback)(bs_id, rnti);
            }
        }
        self.dispatching = false;
        self.ue_connect.compact();
    }

    /// Notify `ue_update` subscribers.
    pub fn publish_ue_update(&mut self, bs_id: BsId, rnti: Rnti) {
        self.dispatching = true;
        for entry in &mut self.ue_update.entries {
            if !entry.cancelled {
                (entry.callback)(bs_id, rnti);
            }
        }
        self.dispatching = false;
        self.ue_update.compact();
    }

    /// Notify `ue_disconnect` subscribers.
    pub fn publish_ue_disconnect(&mut self, bs_id: BsId, rnti: Rnti) {
        self.dispatching = true;
        for entry in &mut self.ue_disconnect.entries {
            if !entry.cancelled {
                (entry.callback)(bs_id, rnti);
            }
        }
        self.dispatching = false;
        self.ue_disconnect.compact();
    }

    /// Notify `bs_add` subscribers.
    pub fn publish_bs_add(&mut self, bs_id: BsId) {
        self.dispatching = true;
        for entry in &mut self.bs_add.entries {
            if !entry.cancelled {
                (entry.callback)(bs_id);
            }
        }
        self.dispatching = false;
        self.bs_add.compact();
    }

    /// Notify `bs_remove` subscribers.
    pub fn publish_bs_remove(&mut self, bs_id: BsId) {
        self.dispatching = true;
        for entry in &mut self.bs_remove.entries {
            if !entry.cancelled {
                (entry.callback)(bs_id);
            }
        }
        self.dispatching = false;
        self.bs_remove.compact();
    }

    /// Whether a `publish_*` call is currently unwinding its subscriber
    /// list. Exposed so a shared owner (e.g. `Arc<Mutex<EventBus>>`) can
    /// check before attempting a reentrant mutation.
    pub const fn is_dispatching(&self) -> bool {
        self.dispatching
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use ranctl_types::{BsId, Rnti};

    use super::EventBus;

    #[test]
    fn tick_subscriber_fires_on_matching_phase() {
        let mut bus = EventBus::new();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let hits_cb = Arc::clone(&hits);
        bus.subscribe_tick(10, 0, move |counter| {
            if let Ok(mut hits) = hits_cb.lock() {
                hits.push(counter);
            }
        });
        for counter in 0..35u64 {
            bus.publish_tick(counter);
        }
        assert_eq!(hits.lock().unwrap_or_else(|e| e.into_inner()).as_slice(), &[0, 10, 20, 30]);
    }

    #[test]
    fn tick_subscriber_respects_offset() {
        let mut bus = EventBus::new();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let hits_cb = Arc::clone(&hits);
        bus.subscribe_tick(10, 3, move |counter| {
            if let Ok(mut hits) = hits_cb.lock() {
                hits.push(counter);
            }
        });
        for counter in 0..25u64 {
            bus.publish_tick(counter);
        }
        assert_eq!(hits.lock().unwrap_or_else(|e| e.into_inner()).as_slice(), &[3, 13, 23]);
    }

    #[test]
    fn subscribers_fire_in_registration_order() {
        let mut bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in 0..3u32 {
            let order_cb = Arc::clone(&order);
            bus.subscribe_bs_add(move |_bs_id| {
                if let Ok(mut order) = order_cb.lock() {
                    order.push(tag);
                }
            });
        }
        bus.publish_bs_add(BsId(1));
        assert_eq!(order.lock().unwrap_or_else(|e| e.into_inner()).as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn unsubscribe_stops_future_delivery() {
        let mut bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));
        let count_cb = Arc::clone(&count);
        let handle = bus.subscribe_ue_connect(move |_bs_id, _rnti| {
            if let Ok(mut count) = count_cb.lock() {
                *count += 1;
            }
        });
        bus.publish_ue_connect(BsId(1), Rnti(10));
        assert!(bus.unsubscribe(handle));
        bus.publish_ue_connect(BsId(1), Rnti(10));
        assert_eq!(*count.lock().unwrap_or_else(|e| e.into_inner()), 1);
    }

    #[test]
    fn unsubscribe_unknown_handle_returns_false() {
        let mut bus = EventBus::new();
        let handle = bus.subscribe_bs_remove(|_bs_id| {});
        assert!(bus.unsubscribe(handle));
        assert!(!bus.unsubscribe(handle));
    }

    #[test]
    fn unsubscribing_before_publish_removes_entry_from_storage() {
        let mut bus = EventBus::new();
        let fired = Arc::new(Mutex::new(Vec::new()));
        let fired_a = Arc::clone(&fired);
        let fired_b = Arc::clone(&fired);

        bus.subscribe_bs_add(move |_bs_id| {
            if let Ok(mut fired) = fired_a.lock() {
                fired.push("a");
            }
        });
        let b = bus.subscribe_bs_add(move |_bs_id| {
            if let Ok(mut fired) = fired_b.lock() {
                fired.push("b");
            }
        });

        assert!(bus.unsubscribe(b));
        bus.publish_bs_add(BsId(1));
        assert_eq!(fired.lock().unwrap_or_else(|e| e.into_inner()).as_slice(), &["a"]);
        assert!(!bus.is_dispatching());
    }
}
