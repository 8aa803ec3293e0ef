//! Session Bootstrap and Channel Lifecycle
//!
//! Entry validates the table through the [`SessionApi`]; when no active
//! session exists the caller is told to go book one, nothing is assumed.
//! Once a session is known the snapshot seeds the store, the session topic
//! is subscribed, and a pump task reconciles events until teardown. The
//! observable phases are [`ContextPhase::NeedsBooking`] (booking is an
//! external collaborator's job), [`ContextPhase::Subscribed`] (pump
//! running) and [`ContextPhase::TornDown`]; validation itself is transient
//! inside [`SessionContext::enter_table`].
//!
//! Teardown is unconditional: both [`SessionContext::leave`] and `Drop`
//! cancel the pump, so no exit path leaks a subscription.

use crate::api::{Credential, SessionApi, TableValidation};
use crate::channel::{session_topic, ConnectionEvent, EventChannel, Subscription};
use crate::error::{CoreError, CoreResult};
use crate::optimistic::OptimisticManager;
use crate::reconcile::Reconciler;
use crate::store::SessionStore;
use shared::order::{ServiceChannel, SessionSnapshot};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Observable lifecycle phase of a session context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPhase {
    /// Table has no active session; booking is external
    NeedsBooking,
    /// Pump running
    Subscribed,
    /// Pump cancelled, context unusable
    TornDown,
}

/// Outcome of entering a table
pub enum TableEntry {
    /// Active session found; context is live and subscribed
    Subscribed(SessionContext),
    /// No active session; an external booking collaborator must create one
    NeedsBooking,
}

impl TableEntry {
    /// Phase this entry left the lifecycle in
    pub fn phase(&self) -> ContextPhase {
        match self {
            TableEntry::Subscribed(context) => context.phase(),
            TableEntry::NeedsBooking => ContextPhase::NeedsBooking,
        }
    }
}

/// A live, subscribed session context
///
/// Owns the store, the pump task and its cancellation token. Dropping the
/// context cancels the pump; [`SessionContext::leave`] additionally awaits
/// its completion.
pub struct SessionContext {
    store: Arc<SessionStore>,
    optimistic: OptimisticManager,
    cancel: CancellationToken,
    pump: Option<JoinHandle<()>>,
    phase: ContextPhase,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Enter a table: validate it and, if a session is active, attach
    pub async fn enter_table(
        api: Arc<dyn SessionApi>,
        channel: Arc<dyn EventChannel>,
        table_id: &str,
        flow: ServiceChannel,
    ) -> CoreResult<TableEntry> {
        tracing::debug!(table_id = %table_id, "Validating table");
        match api.validate_table(table_id).await? {
            TableValidation::Active(snapshot) => {
                let context = Self::attach(api, channel, snapshot, flow).await?;
                Ok(TableEntry::Subscribed(context))
            }
            TableValidation::NeedsBooking => {
                tracing::info!(table_id = %table_id, "No active session, booking required");
                Ok(TableEntry::NeedsBooking)
            }
        }
    }

    /// Authenticate into an existing session by PIN or phone, then attach
    pub async fn authenticate(
        api: Arc<dyn SessionApi>,
        channel: Arc<dyn EventChannel>,
        table_id: &str,
        credential: &Credential,
        flow: ServiceChannel,
    ) -> CoreResult<Self> {
        let snapshot = api.authenticate(table_id, credential).await?;
        Self::attach(api, channel, snapshot, flow).await
    }

    /// Seed the store from a snapshot, subscribe the session topic and
    /// start the event pump.
    ///
    /// Events published before the subscription completes are dropped by
    /// construction; the snapshot is the baseline they would have moved.
    pub async fn attach(
        api: Arc<dyn SessionApi>,
        channel: Arc<dyn EventChannel>,
        snapshot: SessionSnapshot,
        flow: ServiceChannel,
    ) -> CoreResult<Self> {
        let session_id = snapshot.session.session_id.clone();
        let store = Arc::new(SessionStore::from_snapshot(snapshot, flow));

        let subscription = channel.subscribe(&session_topic(&session_id)).await?;
        let cancel = CancellationToken::new();
        let reconciler = Reconciler::new(store.clone());

        let pump = tokio::spawn(run_pump(
            reconciler,
            api.clone(),
            subscription,
            cancel.clone(),
        ));
        tracing::info!(session_id = %session_id, "Session context subscribed");

        Ok(Self {
            optimistic: OptimisticManager::new(store.clone(), api),
            store,
            cancel,
            pump: Some(pump),
            phase: ContextPhase::Subscribed,
        })
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> ContextPhase {
        self.phase
    }

    /// The canonical store for this session
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Writer for user-initiated actions
    pub fn actions(&self) -> CoreResult<&OptimisticManager> {
        if self.phase == ContextPhase::TornDown {
            return Err(CoreError::InvalidPhase("context torn down".to_string()));
        }
        Ok(&self.optimistic)
    }

    /// Cancel the pump and wait for it to stop
    ///
    /// Idempotent; safe to call on an already torn down context.
    pub async fn leave(&mut self) {
        self.phase = ContextPhase::TornDown;
        self.cancel.cancel();
        let Some(pump) = self.pump.take() else {
            return;
        };
        match tokio::time::timeout(std::time::Duration::from_secs(3), pump).await {
            Ok(Ok(())) => tracing::debug!("Event pump stopped"),
            Ok(Err(e)) if e.is_cancelled() => tracing::debug!("Event pump cancelled"),
            Ok(Err(e)) => tracing::error!("Event pump panicked: {}", e),
            Err(_) => tracing::warn!("Event pump did not stop within 3s"),
        }
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        // leave() may not have been called; the pump must not outlive us
        self.cancel.cancel();
    }
}

/// Event pump: reconcile pushed events until cancellation
///
/// Lagging behind the broadcast buffer loses events with no way to replay
/// them, so a lag is handled exactly like a reconnect: full snapshot
/// re-fetch, then resume incremental reconciliation.
async fn run_pump(
    reconciler: Reconciler,
    api: Arc<dyn SessionApi>,
    mut subscription: Subscription,
    cancel: CancellationToken,
) {
    tracing::debug!(topic = %subscription.topic, "Event pump started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(topic = %subscription.topic, "Event pump shutdown");
                break;
            }
            result = subscription.events.recv() => {
                match result {
                    Ok(event) => {
                        if let Err(e) = reconciler.reconcile(&event) {
                            tracing::warn!(
                                event_id = %event.event_id,
                                kind = event.kind(),
                                error = %e,
                                "Event discarded"
                            );
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "Event pump lagged, re-fetching snapshot");
                        refetch_snapshot(&reconciler, &api).await;
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Event channel closed");
                        reconciler.store().set_connected(false);
                        break;
                    }
                }
            }
            result = subscription.connection.recv() => {
                match result {
                    Ok(ConnectionEvent::Disconnected) => {
                        tracing::warn!("Push channel disconnected");
                        reconciler.store().set_connected(false);
                    }
                    Ok(ConnectionEvent::Reconnected) => {
                        tracing::info!("Push channel reconnected, re-fetching snapshot");
                        if refetch_snapshot(&reconciler, &api).await {
                            reconciler.store().set_connected(true);
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        // Missed connectivity notifications; resync as if
                        // reconnected
                        tracing::warn!(lagged = n, "Connection listener lagged");
                        if refetch_snapshot(&reconciler, &api).await {
                            reconciler.store().set_connected(true);
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Connection channel closed");
                        reconciler.store().set_connected(false);
                        break;
                    }
                }
            }
        }
    }
}

/// Fetch a fresh snapshot and install it as the new baseline
async fn refetch_snapshot(reconciler: &Reconciler, api: &Arc<dyn SessionApi>) -> bool {
    let store = reconciler.store();
    match api.fetch_snapshot(&store.session_id()).await {
        Ok(snapshot) => store.install_snapshot(snapshot),
        Err(e) => {
            tracing::warn!(error = %e, "Snapshot re-fetch failed, staying disconnected");
            store.set_connected(false);
            false
        }
    }
}
