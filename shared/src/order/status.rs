//! Status vocabulary - raw codes, channel state machines, display translator
//!
//! Two operational flows share the backend infrastructure and therefore the
//! raw status code space: table service and pickup/delivery. Each flow has
//! its own vocabulary and its own transition rules. The translator maps a
//! raw backend code to a display label for a given channel and view; it is
//! a pure, total function and is safe to call on every render.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Operational flow an order belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceChannel {
    /// Dine-in with table service
    #[default]
    TableService,
    /// Pickup or delivery
    PickupDelivery,
}

/// Which surface is rendering the status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusView {
    /// Customer-facing ordering screen
    Customer,
    /// Kitchen display
    Kitchen,
    /// Admin/staff dashboard
    Admin,
}

/// Typed order status covering both channel vocabularies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    // Shared initial state
    Pending,

    // Table-service vocabulary
    AdminApproved,
    InPreparation,
    ReadyForPickup,
    Served,
    Canceled,

    // Pickup/delivery vocabulary
    Accepted,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Parse a raw backend status code
    ///
    /// Returns `None` for unrecognized codes; callers that only need a
    /// display label should use [`translate`] instead, which never fails.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(Self::Pending),
            "admin_approved" => Some(Self::AdminApproved),
            "in_preparation" => Some(Self::InPreparation),
            "ready_for_pickup" => Some(Self::ReadyForPickup),
            "served" => Some(Self::Served),
            "canceled" => Some(Self::Canceled),
            "accepted" => Some(Self::Accepted),
            "preparing" => Some(Self::Preparing),
            "ready" => Some(Self::Ready),
            "out_for_delivery" => Some(Self::OutForDelivery),
            "delivered" => Some(Self::Delivered),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Raw backend code for this status
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AdminApproved => "admin_approved",
            Self::InPreparation => "in_preparation",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::Served => "served",
            Self::Canceled => "canceled",
            Self::Accepted => "accepted",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether this status is terminal for the given channel
    pub fn is_terminal(&self, channel: ServiceChannel) -> bool {
        match channel {
            ServiceChannel::TableService => matches!(self, Self::Served | Self::Canceled),
            ServiceChannel::PickupDelivery => {
                matches!(self, Self::Delivered | Self::Completed | Self::Cancelled)
            }
        }
    }

    /// Whether the given transition is allowed in the channel's state machine
    ///
    /// Table service: `pending → admin_approved → in_preparation →
    /// ready_for_pickup → served`, with `canceled` reachable from any
    /// non-terminal state.
    ///
    /// Pickup/delivery: `pending → accepted → preparing → ready →
    /// {out_for_delivery → delivered | completed}`, with `cancelled`
    /// reachable from `pending`/`accepted` only.
    pub fn can_transition_to(&self, target: Self, channel: ServiceChannel) -> bool {
        match channel {
            ServiceChannel::TableService => match (self, target) {
                (Self::Pending, Self::AdminApproved)
                | (Self::AdminApproved, Self::InPreparation)
                | (Self::InPreparation, Self::ReadyForPickup)
                | (Self::ReadyForPickup, Self::Served) => true,
                (from, Self::Canceled) => !from.is_terminal(channel),
                _ => false,
            },
            ServiceChannel::PickupDelivery => match (self, target) {
                (Self::Pending, Self::Accepted)
                | (Self::Accepted, Self::Preparing)
                | (Self::Preparing, Self::Ready)
                | (Self::Ready, Self::OutForDelivery)
                | (Self::Ready, Self::Completed)
                | (Self::OutForDelivery, Self::Delivered) => true,
                (Self::Pending | Self::Accepted, Self::Cancelled) => true,
                _ => false,
            },
        }
    }
}

/// Translate a raw backend status code to a display label
///
/// Total over arbitrary input: unrecognized codes fall back to a humanized
/// capitalization of the code itself rather than failing. No side effects.
///
/// Table-service customer view collapses `admin_approved` to "Accepted"
/// and both `in_preparation` and `ready_for_pickup` to "Preparing"; the
/// kitchen and admin views keep the preparation stages distinct.
pub fn translate(raw: &str, channel: ServiceChannel, view: StatusView) -> Cow<'static, str> {
    let status = match OrderStatus::parse(raw) {
        Some(s) => s,
        None => return Cow::Owned(humanize(raw)),
    };

    let label = match channel {
        ServiceChannel::TableService => match (status, view) {
            (OrderStatus::Pending, _) => "Pending",
            (OrderStatus::AdminApproved, _) => "Accepted",
            (OrderStatus::InPreparation, StatusView::Customer) => "Preparing",
            (OrderStatus::InPreparation, _) => "In preparation",
            (OrderStatus::ReadyForPickup, StatusView::Customer) => "Preparing",
            (OrderStatus::ReadyForPickup, _) => "Ready for pickup",
            (OrderStatus::Served, _) => "Served",
            (OrderStatus::Canceled, _) => "Canceled",
            // Codes from the other vocabulary still render sensibly
            _ => return Cow::Owned(humanize(raw)),
        },
        ServiceChannel::PickupDelivery => match status {
            OrderStatus::Pending => "Pending",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::OutForDelivery => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            _ => return Cow::Owned(humanize(raw)),
        },
    };

    Cow::Borrowed(label)
}

/// Fallback humanization: underscores to spaces, sentence case
fn humanize(code: &str) -> String {
    let lowered = code.trim().replace('_', " ").to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
