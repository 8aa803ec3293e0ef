//! Order line items with cancellation/return accounting

use serde::{Deserialize, Serialize};

/// Kind of item-level adjustment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    /// Cancelled before preparation
    Cancel,
    /// Returned after serving
    Return,
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustmentKind::Cancel => write!(f, "CANCEL"),
            AdjustmentKind::Return => write!(f, "RETURN"),
        }
    }
}

/// Structured item modifiers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ItemModifiers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spice_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_notes: Option<String>,
}

/// One line within an order
///
/// `cancelled_quantity` and `returned_quantity` only ever increase; each
/// increase is driven by a discrete adjustment event addressed by item
/// index within the order. The invariant
/// `cancelled_quantity + returned_quantity <= quantity` holds at all times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemSnapshot {
    /// Item display name
    pub name: String,
    /// Unit price
    pub unit_price: f64,
    /// Ordered quantity
    pub quantity: i32,
    /// Quantity cancelled so far (monotonic)
    #[serde(default)]
    pub cancelled_quantity: i32,
    /// Quantity returned so far (monotonic)
    #[serde(default)]
    pub returned_quantity: i32,
    /// Structured modifiers (spice level, dietary notes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<ItemModifiers>,
    /// Reason attached to the most recent adjustment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjust_reason: Option<String>,
    /// Timestamp of the most recent adjustment (Unix milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_at: Option<i64>,
}

impl OrderItemSnapshot {
    /// Create a plain item with no adjustments
    pub fn new(name: impl Into<String>, unit_price: f64, quantity: i32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity,
            cancelled_quantity: 0,
            returned_quantity: 0,
            modifiers: None,
            adjust_reason: None,
            adjusted_at: None,
        }
    }

    /// Ordered quantity minus cancelled minus returned, never negative
    pub fn effective_quantity(&self) -> i32 {
        (self.quantity - self.cancelled_quantity - self.returned_quantity).max(0)
    }

    /// Line total based on the effective quantity
    pub fn line_total(&self) -> f64 {
        self.effective_quantity() as f64 * self.unit_price
    }

    /// Quantity still available for further cancellation/return
    pub fn adjustable_quantity(&self) -> i32 {
        self.effective_quantity()
    }

    /// Whether the whole line has been cancelled/returned
    pub fn is_exhausted(&self) -> bool {
        self.effective_quantity() == 0
    }
}
