//! Realtime Event Reconciler
//!
//! Consumes inbound push events, validates them, and applies them to the
//! store using idempotent merge rules:
//!
//! - events are applied in arrival order; no global sequence number exists
//! - scalar fields (status, totals) are last-write-wins
//! - quantity fields are monotonic bounded increments
//! - a bounded recent-event-id cache filters duplicates as defense in
//!   depth on top of the transport's at-most-once guarantee
//! - malformed events are discarded with a warning; the store is left
//!   unchanged and the reconciler keeps accepting subsequent events

pub mod appliers;

pub use appliers::{EventAction, EventApplier};

use crate::adjust::AdjustError;
use crate::store::SessionStore;
use shared::order::StatusEvent;
use std::sync::Arc;
use thiserror::Error;

/// Reconciliation error - one discarded event, never fatal
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReconcileError {
    /// Event referenced an order the store has never seen
    #[error("unknown order {order_id}")]
    UnknownOrder { order_id: String },

    /// Item adjustment validation failed
    #[error(transparent)]
    Adjust(#[from] AdjustError),
}

/// What reconciling one event did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Event was merged into the store
    Applied,
    /// Duplicate event id; no-op
    Duplicate,
    /// Event belonged to a different session; no-op
    ForeignSession,
    /// Event arrived after SESSION_COMPLETED; accepted but not applied
    IgnoredAfterCompletion,
}

/// Single writer merging authoritative events into the store
pub struct Reconciler {
    store: Arc<SessionStore>,
}

impl Reconciler {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Validate and apply one inbound event
    ///
    /// Errors mean the event was discarded; the store is unchanged and the
    /// caller should log and continue with the next event.
    pub fn reconcile(&self, event: &StatusEvent) -> Result<Applied, ReconcileError> {
        // Guard against late events from a previously subscribed session
        let session_id = self.store.session_id();
        if event.session_id != session_id {
            tracing::warn!(
                event_id = %event.event_id,
                kind = event.kind(),
                expected = %session_id,
                actual = %event.session_id,
                "Dropping event for a different session"
            );
            return Ok(Applied::ForeignSession);
        }

        if !self.store.note_seen(&event.event_id) {
            tracing::debug!(event_id = %event.event_id, kind = event.kind(), "Duplicate event ignored");
            return Ok(Applied::Duplicate);
        }

        if self.store.is_completed() {
            tracing::warn!(
                event_id = %event.event_id,
                kind = event.kind(),
                "Unexpected event after session completion, not applied"
            );
            return Ok(Applied::IgnoredAfterCompletion);
        }

        EventAction::from(event).apply(&self.store, event)?;
        Ok(Applied::Applied)
    }

    /// Handle to the store this reconciler writes to
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }
}
