//! Order snapshot - the client-side representation of one placed order
//!
//! Snapshots are created server-side and reach the client either in the
//! bootstrap payload or via push events. They are never deleted on the
//! client, only transitioned to a terminal status.

use super::item::OrderItemSnapshot;
use super::status::{OrderStatus, ServiceChannel};
use crate::models::Session;
use serde::{Deserialize, Serialize};

/// Channel-specific delivery/pickup metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FulfillmentInfo {
    /// Delivery address (delivery orders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Contact phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Requested pickup time (Unix milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<i64>,
}

/// One placed order within a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Order id (assigned by server)
    pub order_id: String,
    /// Owning session
    pub session_id: String,
    /// Operational flow this order belongs to
    #[serde(default)]
    pub channel: ServiceChannel,
    /// Raw backend status code (last-write-wins scalar; render via the
    /// vocabulary translator)
    pub status: String,
    /// Ordered list of items
    pub items: Vec<OrderItemSnapshot>,
    /// Total amount; equals the sum of effective line totals unless an
    /// authoritative server total has been applied
    pub total_amount: f64,
    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Delivery/pickup metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<FulfillmentInfo>,
    /// Placement timestamp (Unix milliseconds)
    pub ordered_at: i64,
    /// Last update timestamp
    pub updated_at: i64,
}

impl OrderSnapshot {
    /// Create a new pending order with no items
    pub fn new(
        order_id: impl Into<String>,
        session_id: impl Into<String>,
        channel: ServiceChannel,
    ) -> Self {
        let now = crate::util::now_millis();
        Self {
            order_id: order_id.into(),
            session_id: session_id.into(),
            channel,
            status: OrderStatus::Pending.as_code().to_string(),
            items: Vec::new(),
            total_amount: 0.0,
            note: None,
            fulfillment: None,
            ordered_at: now,
            updated_at: now,
        }
    }

    /// Parse the raw status code, if recognized
    pub fn parsed_status(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.status)
    }

    /// Whether the order is in a terminal status for its channel
    pub fn is_terminal(&self) -> bool {
        self.parsed_status()
            .map(|s| s.is_terminal(self.channel))
            .unwrap_or(false)
    }

    /// Sum of `effective_quantity x unit_price` across items
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(|i| i.line_total()).sum()
    }

    /// Recompute `total_amount` locally from the items
    pub fn recompute_total(&mut self) {
        self.total_amount = self.computed_total();
    }

    /// Whether any item still has effective quantity remaining
    ///
    /// An order where every item is fully cancelled/returned is hidden
    /// from active-order views at read time, regardless of its status.
    pub fn has_visible_items(&self) -> bool {
        self.items.iter().any(|i| !i.is_exhausted())
    }
}

/// Full session snapshot - the bootstrap and reconnect-refetch payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub session: Session,
    pub orders: Vec<OrderSnapshot>,
}
