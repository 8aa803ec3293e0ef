//! PAYMENT_REQUEST_CONFIRMED event applier

use super::EventApplier;
use crate::reconcile::ReconcileError;
use crate::store::SessionStore;
use shared::order::{EventPayload, StatusEvent};

/// Authoritative confirmation of the payment-request flag
pub struct PaymentConfirmedApplier;

impl EventApplier for PaymentConfirmedApplier {
    fn apply(&self, store: &SessionStore, event: &StatusEvent) -> Result<(), ReconcileError> {
        let EventPayload::PaymentRequestConfirmed {} = &event.payload else {
            return Ok(());
        };

        tracing::debug!(session_id = %event.session_id, "Payment request confirmed");
        store.confirm_payment_request();
        Ok(())
    }
}
