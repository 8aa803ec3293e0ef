//! Optimistic Update Manager
//!
//! The one place where local state moves ahead of the server. Only the
//! payment-request flag is updated optimistically; every other mutation
//! waits for its authoritative push event. A failed request rolls the flag
//! back unless an authoritative write (confirmation event or reconnect
//! snapshot) landed in between, in which case the authoritative value
//! stands.

use crate::api::SessionApi;
use crate::error::{CoreError, CoreResult};
use crate::reconcile::ReconcileError;
use crate::store::SessionStore;
use shared::order::OrderStatus;
use std::sync::Arc;

/// Writer for user-initiated actions that need immediate UI feedback
pub struct OptimisticManager {
    store: Arc<SessionStore>,
    api: Arc<dyn SessionApi>,
}

impl OptimisticManager {
    pub fn new(store: Arc<SessionStore>, api: Arc<dyn SessionApi>) -> Self {
        Self { store, api }
    }

    /// Request payment for the session
    ///
    /// Sets `payment_requested` before the API call so the UI reflects the
    /// action immediately. Idempotent: a second call while the flag is
    /// already set is a no-op and issues no request.
    pub async fn request_payment(&self) -> CoreResult<()> {
        if self.store.is_completed() {
            return Err(CoreError::InvalidPhase(
                "session already completed".to_string(),
            ));
        }
        if self.store.payment_requested() {
            tracing::debug!("Payment already requested, skipping");
            return Ok(());
        }

        let generation = self.store.set_payment_requested_optimistic();
        let session_id = self.store.session_id();

        if let Err(err) = self.api.request_payment(&session_id).await {
            tracing::warn!(error = %err, "Payment request failed, rolling back");
            if !self.store.rollback_payment_request(generation) {
                // Confirmed or re-fetched while the request was in flight
                tracing::debug!("Rollback superseded by an authoritative write");
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Request an order status transition
    ///
    /// Pure request: the local status is never assumed. The order only
    /// moves when the resulting `ORDER_STATUS_UPDATED` event arrives, so a
    /// rejected or lost request leaves the store untouched.
    pub async fn request_transition(&self, order_id: &str, target: OrderStatus) -> CoreResult<()> {
        let order = self
            .store
            .order(order_id)
            .ok_or_else(|| ReconcileError::UnknownOrder {
                order_id: order_id.to_string(),
            })
            .map_err(CoreError::from)?;

        if order.is_terminal() {
            return Err(CoreError::InvalidPhase(format!(
                "order {order_id} is already in terminal status {}",
                order.status
            )));
        }

        self.api
            .request_transition(&self.store.session_id(), order_id, target)
            .await?;
        Ok(())
    }
}
