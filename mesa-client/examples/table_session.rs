//! Scripted table-service session against the in-memory channel.
//!
//! Run with: cargo run -p mesa-client --example table_session

use async_trait::async_trait;
use mesa_client::channel::session_topic;
use mesa_client::{
    ApiError, Credential, EventPayload, MemoryChannel, OrderSnapshot, OrderStatus, ServiceChannel,
    Session, SessionApi, SessionContext, SessionSnapshot, StatusEvent, StatusView, TableEntry,
    TableValidation,
};
use shared::order::{translate, OrderItemSnapshot};
use std::sync::Arc;
use std::time::Duration;

struct DemoBackend {
    snapshot: SessionSnapshot,
}

#[async_trait]
impl SessionApi for DemoBackend {
    async fn validate_table(&self, _table_id: &str) -> Result<TableValidation, ApiError> {
        Ok(TableValidation::Active(self.snapshot.clone()))
    }

    async fn authenticate(
        &self,
        _table_id: &str,
        _credential: &Credential,
    ) -> Result<SessionSnapshot, ApiError> {
        Ok(self.snapshot.clone())
    }

    async fn fetch_snapshot(&self, _session_id: &str) -> Result<SessionSnapshot, ApiError> {
        Ok(self.snapshot.clone())
    }

    async fn request_payment(&self, _session_id: &str) -> Result<(), ApiError> {
        Ok(())
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

fn print_orders(context: &SessionContext) {
    for order in context.store().active_orders() {
        let label = translate(&order.status, order.channel, StatusView::Customer);
        println!(
            "  {} [{}] total {:.2}",
            order.order_id, label, order.total_amount
        );
        for item in &order.items {
            println!(
                "    {} x{} @ {:.2}",
                item.name,
                item.effective_quantity(),
                item.unit_price
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut session = Session::new("s-demo", "T5", "Ana", "1234");
    let mut order = OrderSnapshot::new("o-1", "s-demo", ServiceChannel::TableService);
    order.items.push(OrderItemSnapshot::new("Paella", 12.5, 2));
    order.items.push(OrderItemSnapshot::new("Sangria", 6.0, 1));
    order.recompute_total();
    session.total_amount = order.total_amount;

    let backend = Arc::new(DemoBackend {
        snapshot: SessionSnapshot {
            session,
            orders: vec![order],
        },
    });
    let channel = Arc::new(MemoryChannel::new());

    let entry = SessionContext::enter_table(
        backend,
        channel.clone(),
        "T5",
        ServiceChannel::TableService,
    )
    .await?;
    let mut context = match entry {
        TableEntry::Subscribed(context) => context,
        TableEntry::NeedsBooking => {
            println!("Table has no active session; book one first");
            return Ok(());
        }
    };

    println!("Bootstrapped session {}", context.store().session_id());
    print_orders(&context);

    let topic = session_topic("s-demo");
    let script = [
        EventPayload::OrderStatusUpdated {
            order_id: "o-1".to_string(),
            status: "admin_approved".to_string(),
        },
        EventPayload::OrderStatusUpdated {
            order_id: "o-1".to_string(),
            status: "in_preparation".to_string(),
        },
        EventPayload::OrderItemCancelled {
            order_id: "o-1".to_string(),
            item_index: 0,
            quantity: 1,
            reason: Some("out of stock".to_string()),
            new_order_total: None,
            new_session_total: None,
        },
        EventPayload::OrderStatusUpdated {
            order_id: "o-1".to_string(),
            status: "served".to_string(),
        },
    ];

    for payload in script {
        channel.publish(&topic, StatusEvent::new("s-demo", payload));
        tokio::time::sleep(Duration::from_millis(100)).await;
        println!("--");
        print_orders(&context);
    }

    context.actions()?.request_payment().await?;
    println!(
        "Payment requested: {}",
        context.store().payment_requested()
    );

    channel.publish(&topic, StatusEvent::new("s-demo", EventPayload::SessionCompleted {}));
    tokio::time::sleep(Duration::from_millis(100)).await;
    if context.store().take_completion_notice() {
        println!("Session completed, thanks for dining with us");
    }

    context.leave().await;
    Ok(())
}
