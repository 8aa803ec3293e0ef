//! OrderItemCancelled / OrderItemReturned event applier
//!
//! Routes both adjustment kinds through the item adjustment engine, then
//! brings the session total up to date: the event's authoritative session
//! total when supplied, a local recomputation otherwise.

use super::EventApplier;
use crate::adjust;
use crate::reconcile::ReconcileError;
use crate::store::SessionStore;
use shared::order::{AdjustmentKind, EventPayload, StatusEvent};

/// Item cancellation/return applier
pub struct ItemAdjustedApplier;

impl EventApplier for ItemAdjustedApplier {
    fn apply(&self, store: &SessionStore, event: &StatusEvent) -> Result<(), ReconcileError> {
        let (order_id, item_index, kind, quantity, reason, new_order_total, new_session_total) =
            match &event.payload {
                EventPayload::OrderItemCancelled {
                    order_id,
                    item_index,
                    quantity,
                    reason,
                    new_order_total,
                    new_session_total,
                } => (
                    order_id,
                    *item_index,
                    AdjustmentKind::Cancel,
                    *quantity,
                    reason,
                    *new_order_total,
                    *new_session_total,
                ),
                EventPayload::OrderItemReturned {
                    order_id,
                    item_index,
                    quantity,
                    reason,
                    new_order_total,
                    new_session_total,
                } => (
                    order_id,
                    *item_index,
                    AdjustmentKind::Return,
                    *quantity,
                    reason,
                    *new_order_total,
                    *new_session_total,
                ),
                _ => return Ok(()),
            };

        let outcome = store
            .with_order_mut(order_id, |order| {
                adjust::apply_adjustment(
                    order,
                    item_index,
                    kind,
                    quantity,
                    reason.as_deref(),
                    new_order_total,
                    event.timestamp,
                )
            })
            .ok_or_else(|| ReconcileError::UnknownOrder {
                order_id: order_id.clone(),
            })??;

        if outcome.clamped {
            tracing::warn!(
                order_id = %order_id,
                item_index,
                kind = %kind,
                requested = quantity,
                applied = outcome.applied,
                "Adjustment increment clamped to remaining quantity"
            );
        }

        store.update_session_total(new_session_total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjust::AdjustError;
    use shared::models::Session;
    use shared::order::{OrderItemSnapshot, OrderSnapshot, ServiceChannel, SessionSnapshot};

    fn store() -> SessionStore {
        let mut order = OrderSnapshot::new("o-1", "s-1", ServiceChannel::TableService);
        order.items.push(OrderItemSnapshot::new("Paella", 10.0, 5));
        order.recompute_total();
        SessionStore::from_snapshot(
            SessionSnapshot {
                session: Session::new("s-1", "T5", "Ana", "1234"),
                orders: vec![order],
            },
            ServiceChannel::TableService,
        )
    }

    fn cancelled_event(
        quantity: i32,
        new_order_total: Option<f64>,
        new_session_total: Option<f64>,
    ) -> StatusEvent {
        StatusEvent::new(
            "s-1",
            EventPayload::OrderItemCancelled {
                order_id: "o-1".to_string(),
                item_index: 0,
                quantity,
                reason: Some("86'd".to_string()),
                new_order_total,
                new_session_total,
            },
        )
    }

    #[test]
    fn test_local_recompute_when_no_totals_supplied() {
        let store = store();
        ItemAdjustedApplier
            .apply(&store, &cancelled_event(2, None, None))
            .unwrap();

        let order = store.order("o-1").unwrap();
        assert_eq!(order.items[0].effective_quantity(), 3);
        assert_eq!(order.total_amount, 30.0);
        // Session total recomputed, never skipped
        assert_eq!(store.session().total_amount, 30.0);
    }

    #[test]
    fn test_authoritative_totals_preferred() {
        let store = store();
        ItemAdjustedApplier
            .apply(&store, &cancelled_event(2, Some(31.0), Some(29.0)))
            .unwrap();

        assert_eq!(store.order("o-1").unwrap().total_amount, 31.0);
        assert_eq!(store.session().total_amount, 29.0);
    }

    #[test]
    fn test_returned_event_routes_to_return_quantity() {
        let store = store();
        let event = StatusEvent::new(
            "s-1",
            EventPayload::OrderItemReturned {
                order_id: "o-1".to_string(),
                item_index: 0,
                quantity: 1,
                reason: None,
                new_order_total: None,
                new_session_total: None,
            },
        );
        ItemAdjustedApplier.apply(&store, &event).unwrap();

        let item = &store.order("o-1").unwrap().items[0];
        assert_eq!(item.returned_quantity, 1);
        assert_eq!(item.cancelled_quantity, 0);
    }

    #[test]
    fn test_out_of_range_index_propagates_as_discard() {
        let store = store();
        let mut event = cancelled_event(1, None, None);
        if let EventPayload::OrderItemCancelled { item_index, .. } = &mut event.payload {
            *item_index = 4;
        }

        let err = ItemAdjustedApplier.apply(&store, &event).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Adjust(AdjustError::ItemIndexOutOfRange { .. })
        ));
        // Session total untouched by the discarded event
        assert_eq!(store.session().total_amount, 0.0);
    }
}
