//! Status events - inbound push notifications describing transitions
//!
//! Events are consumed once by the reconciler and discarded. Payloads are
//! tagged and tolerate additional fields; quantity fields always carry the
//! increment, never an absolute value.

use super::item::OrderItemSnapshot;
use serde::{Deserialize, Serialize};

/// One inbound push notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusEvent {
    /// Event unique id (transport guarantees at-most-once delivery per id;
    /// the reconciler additionally dedups by this id as defense in depth)
    pub event_id: String,
    /// Session this event is scoped to
    pub session_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Event payload
    pub payload: EventPayload,
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    /// Order status transition
    OrderStatusUpdated {
        order_id: String,
        /// Raw backend status code
        status: String,
    },

    /// Item-level partial cancellation
    OrderItemCancelled {
        order_id: String,
        item_index: usize,
        /// Increment, not an absolute value
        quantity: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        /// Authoritative recomputed order total, when the server supplies it
        #[serde(skip_serializing_if = "Option::is_none")]
        new_order_total: Option<f64>,
        /// Authoritative recomputed session total, when supplied
        #[serde(skip_serializing_if = "Option::is_none")]
        new_session_total: Option<f64>,
    },

    /// Item-level partial return
    OrderItemReturned {
        order_id: String,
        item_index: usize,
        quantity: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        new_order_total: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        new_session_total: Option<f64>,
    },

    /// Generic merge: replace whichever fields are present
    OrderUpdated {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        items: Option<Vec<OrderItemSnapshot>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        total_amount: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        session_total: Option<f64>,
    },

    /// Terminal session transition
    SessionCompleted {},

    /// Confirms the optimistic payment-request flag
    PaymentRequestConfirmed {},
}

impl StatusEvent {
    /// Create a new event with a fresh id and the current server time
    pub fn new(session_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            event_id: crate::util::new_id(),
            session_id: session_id.into(),
            timestamp: crate::util::now_millis(),
            payload,
        }
    }

    /// Order targeted by this event, if any
    pub fn order_id(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::OrderStatusUpdated { order_id, .. }
            | EventPayload::OrderItemCancelled { order_id, .. }
            | EventPayload::OrderItemReturned { order_id, .. }
            | EventPayload::OrderUpdated { order_id, .. } => Some(order_id),
            EventPayload::SessionCompleted {} | EventPayload::PaymentRequestConfirmed {} => None,
        }
    }

    /// Short payload kind for logging
    pub fn kind(&self) -> &'static str {
        match &self.payload {
            EventPayload::OrderStatusUpdated { .. } => "ORDER_STATUS_UPDATED",
            EventPayload::OrderItemCancelled { .. } => "ORDER_ITEM_CANCELLED",
            EventPayload::OrderItemReturned { .. } => "ORDER_ITEM_RETURNED",
            EventPayload::OrderUpdated { .. } => "ORDER_UPDATED",
            EventPayload::SessionCompleted {} => "SESSION_COMPLETED",
            EventPayload::PaymentRequestConfirmed {} => "PAYMENT_REQUEST_CONFIRMED",
        }
    }
}
