//! Item Adjustment Engine
//!
//! Pure functions computing effective quantities and recomputed totals
//! for item-level cancellations and returns. Quantity fields only ever
//! increase; an adjustment event carries the increment, and increments
//! are clamped so `cancelled + returned <= quantity` holds after any
//! event sequence, including late or replayed deliveries.

use shared::order::{AdjustmentKind, OrderSnapshot};
use thiserror::Error;

/// Adjustment validation error
///
/// A failed adjustment leaves the order untouched; callers log it as a
/// reconciliation warning and keep processing subsequent events.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdjustError {
    #[error("item index {item_index} out of range for order {order_id} ({item_count} items)")]
    ItemIndexOutOfRange {
        order_id: String,
        item_index: usize,
        item_count: usize,
    },

    #[error("non-positive adjustment quantity {quantity} for order {order_id}")]
    NonPositiveQuantity { order_id: String, quantity: i32 },
}

/// Result of a successfully applied adjustment
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentOutcome {
    /// Increment actually applied after clamping
    pub applied: i32,
    /// Whether the requested increment exceeded the remaining quantity
    pub clamped: bool,
    /// Order total after the adjustment
    pub order_total: f64,
}

/// Apply one cancellation/return adjustment to an order
///
/// The order total is taken from `new_order_total` when the event supplies
/// it; otherwise it is recomputed locally as the sum of
/// `effective_quantity x unit_price` across items. The update is never
/// silently skipped.
pub fn apply_adjustment(
    order: &mut OrderSnapshot,
    item_index: usize,
    kind: AdjustmentKind,
    quantity: i32,
    reason: Option<&str>,
    new_order_total: Option<f64>,
    timestamp: i64,
) -> Result<AdjustmentOutcome, AdjustError> {
    if item_index >= order.items.len() {
        return Err(AdjustError::ItemIndexOutOfRange {
            order_id: order.order_id.clone(),
            item_index,
            item_count: order.items.len(),
        });
    }
    if quantity <= 0 {
        return Err(AdjustError::NonPositiveQuantity {
            order_id: order.order_id.clone(),
            quantity,
        });
    }

    let item = &mut order.items[item_index];
    let applied = quantity.min(item.adjustable_quantity());
    match kind {
        AdjustmentKind::Cancel => item.cancelled_quantity += applied,
        AdjustmentKind::Return => item.returned_quantity += applied,
    }
    if let Some(reason) = reason {
        item.adjust_reason = Some(reason.to_string());
    }
    item.adjusted_at = Some(timestamp);

    match new_order_total {
        Some(total) => order.total_amount = total,
        None => order.recompute_total(),
    }
    order.updated_at = timestamp;

    Ok(AdjustmentOutcome {
        applied,
        clamped: applied < quantity,
        order_total: order.total_amount,
    })
}
