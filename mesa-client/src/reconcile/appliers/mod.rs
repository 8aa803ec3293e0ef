//! Event applier implementations
//!
//! Each applier handles one event kind and is the only code that mutates
//! the store for that kind. Appliers assume the reconciler has already
//! done session-id guarding and duplicate filtering.

use enum_dispatch::enum_dispatch;

use super::ReconcileError;
use crate::store::SessionStore;
use shared::order::{EventPayload, StatusEvent};

mod item_adjusted;
mod order_updated;
mod payment_confirmed;
mod session_completed;
mod status_updated;

pub use item_adjusted::ItemAdjustedApplier;
pub use order_updated::OrderUpdatedApplier;
pub use payment_confirmed::PaymentConfirmedApplier;
pub use session_completed::SessionCompletedApplier;
pub use status_updated::StatusUpdatedApplier;

/// Applies one validated event to the store
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, store: &SessionStore, event: &StatusEvent) -> Result<(), ReconcileError>;
}

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    StatusUpdated(StatusUpdatedApplier),
    ItemAdjusted(ItemAdjustedApplier),
    OrderUpdated(OrderUpdatedApplier),
    SessionCompleted(SessionCompletedApplier),
    PaymentConfirmed(PaymentConfirmedApplier),
}

/// Convert StatusEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload kinds.
impl From<&StatusEvent> for EventAction {
    fn from(event: &StatusEvent) -> Self {
        match &event.payload {
            EventPayload::OrderStatusUpdated { .. } => {
                EventAction::StatusUpdated(StatusUpdatedApplier)
            }
            EventPayload::OrderItemCancelled { .. } | EventPayload::OrderItemReturned { .. } => {
                EventAction::ItemAdjusted(ItemAdjustedApplier)
            }
            EventPayload::OrderUpdated { .. } => EventAction::OrderUpdated(OrderUpdatedApplier),
            EventPayload::SessionCompleted {} => {
                EventAction::SessionCompleted(SessionCompletedApplier)
            }
            EventPayload::PaymentRequestConfirmed {} => {
                EventAction::PaymentConfirmed(PaymentConfirmedApplier)
            }
        }
    }
}
