//! Canonical State Store
//!
//! In-memory authoritative client-side representation of the active
//! session, its orders and their items. The store is an explicit,
//! constructed object handed to collaborators by reference; there is no
//! ambient singleton. Rendering collaborators only read; the reconciler,
//! the optimistic manager and the bootstrap are the only writers, all on
//! the same logical task, so the interior lock is uncontended in practice.

use parking_lot::RwLock;
use shared::models::{Session, SessionStatus};
use shared::order::{OrderSnapshot, OrderStatus, ServiceChannel, SessionSnapshot};
use std::collections::{HashSet, VecDeque};
use tokio::sync::watch;

/// Bounded recent-event-id cache size (defense in depth against duplicate
/// delivery; the transport already guarantees at-most-once per event id)
const SEEN_EVENTS_CAPACITY: usize = 256;

/// Bounded FIFO set of recently applied event ids
#[derive(Debug, Default)]
struct SeenEvents {
    ids: HashSet<String>,
    order: VecDeque<String>,
}

impl SeenEvents {
    /// Record an event id; returns false if it was already present
    fn insert(&mut self, event_id: &str) -> bool {
        if self.ids.contains(event_id) {
            return false;
        }
        if self.order.len() >= SEEN_EVENTS_CAPACITY {
            if let Some(evicted) = self.order.pop_front() {
                self.ids.remove(&evicted);
            }
        }
        self.ids.insert(event_id.to_string());
        self.order.push_back(event_id.to_string());
        true
    }
}

#[derive(Debug)]
struct StoreState {
    session: Session,
    /// Orders in arrival order
    orders: Vec<OrderSnapshot>,
    seen_events: SeenEvents,
    /// One-time user-visible notice pending after SESSION_COMPLETED
    completion_notice: bool,
    /// Bumped whenever an authoritative write touches the payment flag
    /// (confirmation event or snapshot install). Optimistic rollbacks
    /// only apply while the generation is unchanged.
    confirm_generation: u64,
}

/// Canonical client-side state for one session
#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<StoreState>,
    channel: ServiceChannel,
    connected_tx: watch::Sender<bool>,
}

impl SessionStore {
    /// Create a store seeded from a full session snapshot
    pub fn from_snapshot(snapshot: SessionSnapshot, channel: ServiceChannel) -> Self {
        let (connected_tx, _) = watch::channel(true);
        Self {
            inner: RwLock::new(StoreState {
                session: snapshot.session,
                orders: snapshot.orders,
                seen_events: SeenEvents::default(),
                completion_notice: false,
                confirm_generation: 0,
            }),
            channel,
            connected_tx,
        }
    }

    /// Create a store for a fresh session with no orders yet
    pub fn new(session: Session, channel: ServiceChannel) -> Self {
        Self::from_snapshot(
            SessionSnapshot {
                session,
                orders: Vec::new(),
            },
            channel,
        )
    }

    // ==================== Read API ====================

    /// Operational flow of the session context
    pub fn channel(&self) -> ServiceChannel {
        self.channel
    }

    /// Owning session id
    pub fn session_id(&self) -> String {
        self.inner.read().session.session_id.clone()
    }

    /// Current session state
    pub fn session(&self) -> Session {
        self.inner.read().session.clone()
    }

    /// Whether the session has reached its terminal state
    pub fn is_completed(&self) -> bool {
        self.inner.read().session.status == SessionStatus::Completed
    }

    /// Current payment-request flag (optimistic or confirmed)
    pub fn payment_requested(&self) -> bool {
        self.inner.read().session.payment_requested
    }

    /// All orders, in arrival order
    pub fn orders(&self) -> Vec<OrderSnapshot> {
        self.inner.read().orders.clone()
    }

    /// One order by id
    pub fn order(&self, order_id: &str) -> Option<OrderSnapshot> {
        self.inner
            .read()
            .orders
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned()
    }

    /// Orders visible in "active orders" views
    ///
    /// Filters terminal orders and orders whose every item has effective
    /// quantity zero. Filtering happens here at read time; statuses are
    /// never mutated to hide an order.
    pub fn active_orders(&self) -> Vec<OrderSnapshot> {
        self.inner
            .read()
            .orders
            .iter()
            .filter(|o| !o.is_terminal() && o.has_visible_items())
            .cloned()
            .collect()
    }

    /// Watch channel for transport connectivity (true = connected)
    pub fn subscribe_connectivity(&self) -> watch::Receiver<bool> {
        self.connected_tx.subscribe()
    }

    /// Current connectivity flag
    pub fn connected(&self) -> bool {
        *self.connected_tx.borrow()
    }

    /// Consume the one-time session-completed notice, if pending
    pub fn take_completion_notice(&self) -> bool {
        let mut state = self.inner.write();
        std::mem::take(&mut state.completion_notice)
    }

    // ==================== Write API (crate-internal) ====================

    /// Record an event id; false means duplicate
    pub(crate) fn note_seen(&self, event_id: &str) -> bool {
        self.inner.write().seen_events.insert(event_id)
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected_tx.send_if_modified(|current| {
            if *current != connected {
                *current = connected;
                true
            } else {
                false
            }
        });
    }

    /// Mutate one order in place; returns false if the order is unknown
    pub(crate) fn with_order_mut<R>(
        &self,
        order_id: &str,
        f: impl FnOnce(&mut OrderSnapshot) -> R,
    ) -> Option<R> {
        let mut state = self.inner.write();
        state
            .orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .map(f)
    }

    /// Insert an order that arrived via a push event
    pub(crate) fn insert_order(&self, order: OrderSnapshot) {
        self.inner.write().orders.push(order);
    }

    /// Update the session total: authoritative value when supplied,
    /// local recomputation across non-cancelled orders otherwise.
    /// Never skipped.
    pub(crate) fn update_session_total(&self, authoritative: Option<f64>) {
        let mut state = self.inner.write();
        state.session.total_amount = match authoritative {
            Some(total) => total,
            None => recompute_session_total(&state.orders),
        };
    }

    /// Apply the terminal session transition and queue the one-time notice
    pub(crate) fn mark_completed(&self) {
        let mut state = self.inner.write();
        state.session.status = SessionStatus::Completed;
        state.completion_notice = true;
    }

    /// Authoritative payment-request confirmation (idempotent)
    pub(crate) fn confirm_payment_request(&self) {
        let mut state = self.inner.write();
        state.session.payment_requested = true;
        state.confirm_generation += 1;
    }

    /// Optimistic payment-request write; returns the confirmation
    /// generation observed at write time, to be passed to
    /// [`Self::rollback_payment_request`] on failure.
    pub(crate) fn set_payment_requested_optimistic(&self) -> u64 {
        let mut state = self.inner.write();
        state.session.payment_requested = true;
        state.confirm_generation
    }

    /// Roll back an optimistic payment-request write
    ///
    /// Applies only if no authoritative write (confirmation event or
    /// snapshot install) happened since the optimistic write; returns
    /// whether the rollback was applied.
    pub(crate) fn rollback_payment_request(&self, generation: u64) -> bool {
        let mut state = self.inner.write();
        if state.confirm_generation != generation {
            return false;
        }
        state.session.payment_requested = false;
        true
    }

    /// Replace session and orders with a freshly fetched snapshot
    ///
    /// Used on reconnect: events missed during the disconnect window are
    /// unrecoverable, so the snapshot becomes the new baseline. The
    /// snapshot is authoritative for every scalar including
    /// `payment_requested`; the confirmation generation is bumped so that
    /// in-flight optimistic rollbacks no longer apply.
    ///
    /// Returns false (and leaves the store unchanged) if the snapshot
    /// belongs to a different session.
    pub(crate) fn install_snapshot(&self, snapshot: SessionSnapshot) -> bool {
        let mut state = self.inner.write();
        if snapshot.session.session_id != state.session.session_id {
            tracing::warn!(
                expected = %state.session.session_id,
                actual = %snapshot.session.session_id,
                "Refusing snapshot for a different session"
            );
            return false;
        }
        state.session = snapshot.session;
        state.orders = snapshot.orders;
        state.confirm_generation += 1;
        true
    }
}

/// Session total fallback: sum of totals across non-cancelled orders
fn recompute_session_total(orders: &[OrderSnapshot]) -> f64 {
    orders
        .iter()
        .filter(|o| {
            !matches!(
                o.parsed_status(),
                Some(OrderStatus::Canceled) | Some(OrderStatus::Cancelled)
            )
        })
        .map(|o| o.total_amount)
        .sum()
}
