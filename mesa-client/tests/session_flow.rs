//! End-to-end session flow against the in-memory channel
//!
//! Exercises the whole stack the way the surrounding product would: enter
//! a table, pump pushed events, request payment, survive a reconnect, and
//! tear down.

use async_trait::async_trait;
use mesa_client::channel::session_topic;
use mesa_client::{
    ApiError, ConnectionEvent, CoreError, Credential, EventChannel, EventPayload, MemoryChannel,
    OrderSnapshot, OrderStatus, ServiceChannel, Session, SessionApi, SessionContext,
    SessionSnapshot, StatusEvent, TableEntry, TableValidation,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Scriptable backend double
struct FakeBackend {
    snapshot: Mutex<SessionSnapshot>,
    needs_booking: Mutex<bool>,
    fail_payments: Mutex<bool>,
    payment_calls: Mutex<u32>,
}

impl FakeBackend {
    fn new(snapshot: SessionSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            needs_booking: Mutex::new(false),
            fail_payments: Mutex::new(false),
            payment_calls: Mutex::new(0),
        }
    }

    fn set_snapshot(&self, snapshot: SessionSnapshot) {
        *self.snapshot.lock() = snapshot;
    }

    fn set_needs_booking(&self, needs: bool) {
        *self.needs_booking.lock() = needs;
    }

    fn set_fail_payments(&self, fail: bool) {
        *self.fail_payments.lock() = fail;
    }
}

#[async_trait]
impl SessionApi for FakeBackend {
    async fn validate_table(&self, _table_id: &str) -> Result<TableValidation, ApiError> {
        if *self.needs_booking.lock() {
            Ok(TableValidation::NeedsBooking)
        } else {
            Ok(TableValidation::Active(self.snapshot.lock().clone()))
        }
    }

    async fn authenticate(
        &self,
        _table_id: &str,
        credential: &Credential,
    ) -> Result<SessionSnapshot, ApiError> {
        let snapshot = self.snapshot.lock().clone();
        match credential {
            Credential::Pin(pin) if *pin == snapshot.session.pin => Ok(snapshot),
            _ => Err(ApiError::Unauthorized),
        }
    }

    async fn fetch_snapshot(&self, _session_id: &str) -> Result<SessionSnapshot, ApiError> {
        Ok(self.snapshot.lock().clone())
    }

    async fn request_payment(&self, _session_id: &str) -> Result<(), ApiError> {
        *self.payment_calls.lock() += 1;
        if *self.fail_payments.lock() {
            Err(ApiError::Request("gateway timeout".to_string()))
        } else {
            Ok(())
        }
    }

    async fn request_transition(
        &self,
        _session_id: &str,
        _order_id: &str,
        _target: OrderStatus,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}

fn seed_snapshot() -> SessionSnapshot {
    let mut session = Session::new("s-1", "T5", "Ana", "1234");
    let mut order = OrderSnapshot::new("o-1", "s-1", ServiceChannel::TableService);
    order
        .items
        .push(shared::order::OrderItemSnapshot::new("Paella", 10.0, 5));
    order.recompute_total();
    session.total_amount = order.total_amount;
    SessionSnapshot {
        session,
        orders: vec![order],
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

async fn subscribed_context(
    backend: &Arc<FakeBackend>,
    channel: &Arc<MemoryChannel>,
) -> SessionContext {
    let entry = SessionContext::enter_table(
        backend.clone(),
        channel.clone(),
        "T5",
        ServiceChannel::TableService,
    )
    .await
    .unwrap();
    match entry {
        TableEntry::Subscribed(context) => context,
        TableEntry::NeedsBooking => panic!("expected an active session"),
    }
}

#[tokio::test]
async fn full_table_service_flow() {
    let backend = Arc::new(FakeBackend::new(seed_snapshot()));
    let channel = Arc::new(MemoryChannel::new());
    let mut context = subscribed_context(&backend, &channel).await;
    let topic = session_topic("s-1");

    // Kitchen approves and starts preparing
    channel.publish(
        &topic,
        StatusEvent::new(
            "s-1",
            EventPayload::OrderStatusUpdated {
                order_id: "o-1".to_string(),
                status: "admin_approved".to_string(),
            },
        ),
    );
    // Two portions 86'd, server recomputed the totals
    channel.publish(
        &topic,
        StatusEvent::new(
            "s-1",
            EventPayload::OrderItemCancelled {
                order_id: "o-1".to_string(),
                item_index: 0,
                quantity: 2,
                reason: Some("out of stock".to_string()),
                new_order_total: Some(30.0),
                new_session_total: Some(30.0),
            },
        ),
    );
    settle().await;

    let order = context.store().order("o-1").unwrap();
    assert_eq!(order.status, "admin_approved");
    assert_eq!(order.items[0].effective_quantity(), 3);
    assert_eq!(order.total_amount, 30.0);
    assert_eq!(context.store().session().total_amount, 30.0);

    // Customer asks for the bill; flag flips before the backend answers
    context.actions().unwrap().request_payment().await.unwrap();
    assert!(context.store().payment_requested());

    // Staff settles the table
    channel.publish(&topic, StatusEvent::new("s-1", EventPayload::SessionCompleted {}));
    settle().await;

    assert!(context.store().is_completed());
    assert!(context.store().take_completion_notice());
    assert!(!context.store().take_completion_notice());

    context.leave().await;
}

#[tokio::test]
async fn payment_rollback_unless_confirmed_first() {
    let backend = Arc::new(FakeBackend::new(seed_snapshot()));
    let channel = Arc::new(MemoryChannel::new());
    let mut context = subscribed_context(&backend, &channel).await;

    // Failed request rolls the optimistic flag back
    backend.set_fail_payments(true);
    let err = context.actions().unwrap().request_payment().await.unwrap_err();
    assert!(matches!(err, CoreError::Api(ApiError::Request(_))));
    assert!(!context.store().payment_requested());

    // Confirmation event arriving out of band is authoritative and sticks
    channel.publish(
        &session_topic("s-1"),
        StatusEvent::new("s-1", EventPayload::PaymentRequestConfirmed {}),
    );
    settle().await;
    assert!(context.store().payment_requested());

    // Repeat request while confirmed: idempotent, no extra call
    let calls_before = *backend.payment_calls.lock();
    context.actions().unwrap().request_payment().await.unwrap();
    assert_eq!(*backend.payment_calls.lock(), calls_before);

    context.leave().await;
}

#[tokio::test]
async fn reconnect_rebaselines_from_snapshot() {
    let backend = Arc::new(FakeBackend::new(seed_snapshot()));
    let channel = Arc::new(MemoryChannel::new());
    let mut context = subscribed_context(&backend, &channel).await;

    channel.emit_connection(ConnectionEvent::Disconnected);
    settle().await;
    assert!(!context.store().connected());

    // While disconnected the kitchen served the order and a second order
    // was placed from another device; none of those events will replay.
    let mut fresh = seed_snapshot();
    fresh.orders[0].status = "served".to_string();
    let mut second = OrderSnapshot::new("o-2", "s-1", ServiceChannel::TableService);
    second
        .items
        .push(shared::order::OrderItemSnapshot::new("Flan", 4.0, 2));
    second.recompute_total();
    fresh.session.total_amount = fresh.orders[0].total_amount + second.total_amount;
    fresh.orders.push(second);
    backend.set_snapshot(fresh);

    channel.emit_connection(ConnectionEvent::Reconnected);
    settle().await;

    assert!(context.store().connected());
    assert_eq!(context.store().orders().len(), 2);
    assert_eq!(context.store().order("o-1").unwrap().status, "served");
    assert_eq!(context.store().session().total_amount, 58.0);

    // Incremental reconciliation resumes on the new baseline
    channel.publish(
        &session_topic("s-1"),
        StatusEvent::new(
            "s-1",
            EventPayload::OrderStatusUpdated {
                order_id: "o-2".to_string(),
                status: "in_preparation".to_string(),
            },
        ),
    );
    settle().await;
    assert_eq!(context.store().order("o-2").unwrap().status, "in_preparation");

    context.leave().await;
}

#[tokio::test]
async fn booking_supplies_a_fresh_session_topic() {
    let backend = Arc::new(FakeBackend::new(seed_snapshot()));
    backend.set_needs_booking(true);
    let channel = Arc::new(MemoryChannel::new());

    let entry = SessionContext::enter_table(
        backend.clone(),
        channel.clone(),
        "T5",
        ServiceChannel::TableService,
    )
    .await
    .unwrap();
    assert!(matches!(entry, TableEntry::NeedsBooking));

    // The booking collaborator creates a brand-new session for the table
    // and hands its snapshot back into the core.
    let booked = SessionSnapshot {
        session: Session::new("s-new", "T5", "Ana", "4321"),
        orders: vec![],
    };
    backend.set_snapshot(booked.clone());
    backend.set_needs_booking(false);

    let mut context = SessionContext::attach(
        backend.clone(),
        channel.clone(),
        booked,
        ServiceChannel::TableService,
    )
    .await
    .unwrap();
    assert_eq!(context.store().session_id(), "s-new");

    // Events for the new session arrive on its own topic
    channel.publish(
        &session_topic("s-new"),
        StatusEvent::new(
            "s-new",
            EventPayload::OrderUpdated {
                order_id: "o-10".to_string(),
                items: Some(vec![shared::order::OrderItemSnapshot::new(
                    "Gazpacho", 5.0, 2,
                )]),
                status: None,
                total_amount: None,
                session_total: None,
            },
        ),
    );
    settle().await;
    assert_eq!(context.store().orders().len(), 1);
    assert_eq!(context.store().session().total_amount, 10.0);

    // The table's previous session topic has no subscriber left
    assert_eq!(
        channel.publish(
            &session_topic("s-1"),
            StatusEvent::new(
                "s-new",
                EventPayload::OrderStatusUpdated {
                    order_id: "o-10".to_string(),
                    status: "served".to_string(),
                },
            ),
        ),
        0
    );

    // A stale-session event misrouted onto the live topic is guarded out
    channel.publish(
        &session_topic("s-new"),
        StatusEvent::new(
            "s-1",
            EventPayload::OrderStatusUpdated {
                order_id: "o-10".to_string(),
                status: "served".to_string(),
            },
        ),
    );
    settle().await;
    assert_eq!(context.store().order("o-10").unwrap().status, "pending");

    context.leave().await;
}

#[tokio::test]
async fn stale_session_events_never_leak_in() {
    let backend = Arc::new(FakeBackend::new(seed_snapshot()));
    let channel = Arc::new(MemoryChannel::new());
    let mut context = subscribed_context(&backend, &channel).await;

    // An event for another session published on our topic (misrouted
    // upstream) is rejected by the reconciler's session guard.
    channel.publish(
        &session_topic("s-1"),
        StatusEvent::new(
            "s-other",
            EventPayload::OrderStatusUpdated {
                order_id: "o-1".to_string(),
                status: "served".to_string(),
            },
        ),
    );
    settle().await;
    assert_eq!(context.store().order("o-1").unwrap().status, "pending");

    context.leave().await;
}
