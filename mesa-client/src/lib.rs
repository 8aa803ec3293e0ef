//! Mesa Client - order-status synchronization core
//!
//! Keeps a client-side session store consistent with server push events:
//! snapshot bootstrap, incremental event reconciliation, optimistic
//! payment requests with rollback, and reconnect recovery.

pub mod adjust;
pub mod api;
pub mod bootstrap;
pub mod channel;
pub mod error;
pub mod optimistic;
pub mod reconcile;
pub mod store;

pub use bootstrap::{ContextPhase, SessionContext, TableEntry};
pub use error::{CoreError, CoreResult};
pub use optimistic::OptimisticManager;
pub use reconcile::{Applied, Reconciler};
pub use store::SessionStore;

// Re-export shared types for convenience
pub use shared::models::{Session, SessionStatus};
pub use shared::order::{
    EventPayload, OrderSnapshot, OrderStatus, ServiceChannel, SessionSnapshot, StatusEvent,
    StatusView,
};

// Collaborator seams
pub use api::{ApiError, Credential, SessionApi, TableValidation};
pub use channel::{ConnectionEvent, EventChannel, MemoryChannel, Subscription};
