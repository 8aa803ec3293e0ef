//! ORDER_UPDATED event applier
//!
//! Generic merge: whichever fields the payload carries replace the stored
//! ones; absent fields are left alone. An unknown order id with an item
//! list means the order was placed from another device in the same
//! session, so the order is created rather than dropped.

use super::EventApplier;
use crate::reconcile::ReconcileError;
use crate::store::SessionStore;
use shared::order::{EventPayload, OrderSnapshot, StatusEvent};

/// ORDER_UPDATED applier
pub struct OrderUpdatedApplier;

impl EventApplier for OrderUpdatedApplier {
    fn apply(&self, store: &SessionStore, event: &StatusEvent) -> Result<(), ReconcileError> {
        let EventPayload::OrderUpdated {
            order_id,
            items,
            status,
            total_amount,
            session_total,
        } = &event.payload
        else {
            return Ok(());
        };

        let merged = store.with_order_mut(order_id, |order| {
            if let Some(items) = items {
                order.items = items.clone();
            }
            if let Some(status) = status {
                order.status = status.clone();
            }
            match total_amount {
                Some(total) => order.total_amount = *total,
                // Replaced items invalidate the stored total
                None if items.is_some() => order.recompute_total(),
                None => {}
            }
            order.updated_at = event.timestamp;
        });

        if merged.is_none() {
            // A new order only materializes if the event carries its items
            let Some(items) = items else {
                return Err(ReconcileError::UnknownOrder {
                    order_id: order_id.clone(),
                });
            };
            tracing::info!(order_id = %order_id, "Creating order from push event");
            let mut order =
                OrderSnapshot::new(order_id.clone(), event.session_id.clone(), store.channel());
            order.items = items.clone();
            if let Some(status) = status {
                order.status = status.clone();
            }
            match total_amount {
                Some(total) => order.total_amount = *total,
                None => order.recompute_total(),
            }
            order.ordered_at = event.timestamp;
            order.updated_at = event.timestamp;
            store.insert_order(order);
        }

        store.update_session_total(*session_total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Session;
    use shared::order::{OrderItemSnapshot, ServiceChannel, SessionSnapshot};

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

    fn updated_event(
        order_id: &str,
        items: Option<Vec<OrderItemSnapshot>>,
        status: Option<&str>,
        total_amount: Option<f64>,
        session_total: Option<f64>,
    ) -> StatusEvent {
        StatusEvent::new(
            "s-1",
            EventPayload::OrderUpdated {
                order_id: order_id.to_string(),
                items,
                status: status.map(str::to_string),
                total_amount,
                session_total,
            },
        )
    }

    #[test]
    fn test_absent_fields_left_alone() {
        let store = store();
        OrderUpdatedApplier
            .apply(
                &store,
                &updated_event("o-1", None, Some("in_preparation"), None, None),
            )
            .unwrap();

        let order = store.order("o-1").unwrap();
        assert_eq!(order.status, "in_preparation");
        // Items and total untouched
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_amount, 50.0);
    }

    #[test]
    fn test_replaced_items_without_total_trigger_recompute() {
        let store = store();
        let items = vec![
            OrderItemSnapshot::new("Paella", 10.0, 2),
            OrderItemSnapshot::new("Sangria", 6.0, 1),
        ];
        OrderUpdatedApplier
            .apply(&store, &updated_event("o-1", Some(items), None, None, None))
            .unwrap();

        let order = store.order("o-1").unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, 26.0);
        assert_eq!(store.session().total_amount, 26.0);
    }

    #[test]
    fn test_unknown_order_with_items_is_created() {
        let store = store();
        let items = vec![OrderItemSnapshot::new("Flan", 4.0, 2)];
        OrderUpdatedApplier
            .apply(
                &store,
                &updated_event("o-2", Some(items), Some("pending"), None, Some(58.0)),
            )
            .unwrap();

        let created = store.order("o-2").unwrap();
        assert_eq!(created.session_id, "s-1");
        assert_eq!(created.channel, ServiceChannel::TableService);
        assert_eq!(created.total_amount, 8.0);
        assert_eq!(store.orders().len(), 2);
        assert_eq!(store.session().total_amount, 58.0);
    }

    #[test]
    fn test_unknown_order_without_items_is_error() {
        let store = store();
        let err = OrderUpdatedApplier
            .apply(
                &store,
                &updated_event("o-ghost", None, Some("served"), None, None),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ReconcileError::UnknownOrder {
                order_id: "o-ghost".to_string()
            }
        );
        assert_eq!(store.orders().len(), 1);
    }

    #[test]
    fn test_authoritative_totals_applied_verbatim() {
        let store = store();
        OrderUpdatedApplier
            .apply(&store, &updated_event("o-1", None, None, Some(45.0), Some(45.0)))
            .unwrap();

        assert_eq!(store.order("o-1").unwrap().total_amount, 45.0);
        assert_eq!(store.session().total_amount, 45.0);
    }
}
