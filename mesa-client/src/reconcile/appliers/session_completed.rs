//! SESSION_COMPLETED event applier

use super::EventApplier;
use crate::reconcile::ReconcileError;
use crate::store::SessionStore;
use shared::order::{EventPayload, StatusEvent};

/// Terminal session transition applier
pub struct SessionCompletedApplier;

impl EventApplier for SessionCompletedApplier {
    fn apply(&self, store: &SessionStore, event: &StatusEvent) -> Result<(), ReconcileError> {
        let EventPayload::SessionCompleted {} = &event.payload else {
            return Ok(());
        };

        tracing::info!(session_id = %event.session_id, "Session completed");
        store.mark_completed();
        Ok(())
    }
}
