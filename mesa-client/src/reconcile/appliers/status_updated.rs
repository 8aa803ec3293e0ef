//! OrderStatusUpdated event applier
//!
//! Status is a last-write-wins scalar: arrival order at this client is the
//! only ordering guarantee, so a transition that is not legal from the
//! currently held status is still applied (and logged). Whether
//! last-write-wins is correct under concurrent staff actions is an open
//! ambiguity of the protocol; this applier makes the behavior explicit
//! rather than guessing.

use super::EventApplier;
use crate::reconcile::ReconcileError;
use crate::store::SessionStore;
use shared::order::{EventPayload, OrderStatus, StatusEvent};

/// OrderStatusUpdated applier
pub struct StatusUpdatedApplier;

impl EventApplier for StatusUpdatedApplier {
    fn apply(&self, store: &SessionStore, event: &StatusEvent) -> Result<(), ReconcileError> {
        let EventPayload::OrderStatusUpdated { order_id, status } = &event.payload else {
            return Ok(());
        };

        store
            .with_order_mut(order_id, |order| {
                match (order.parsed_status(), OrderStatus::parse(status)) {
                    (Some(from), Some(to)) => {
                        if !from.can_transition_to(to, order.channel) {
                            tracing::warn!(
                                order_id = %order.order_id,
                                from = from.as_code(),
                                to = to.as_code(),
                                "Non-sequential status transition applied (last-write-wins)"
                            );
                        }
                    }
                    (_, None) => {
                        // Unknown codes are stored as-is; the translator
                        // renders them with a humanized fallback.
                        tracing::debug!(
                            order_id = %order.order_id,
                            status = %status,
                            "Unrecognized status code stored verbatim"
                        );
                    }
                    _ => {}
                }
                order.status = status.clone();
                order.updated_at = event.timestamp;
            })
            .ok_or_else(|| ReconcileError::UnknownOrder {
                order_id: order_id.clone(),
            })
    }
}
