//! Core error types

use thiserror::Error;

/// Synchronization core error type
#[derive(Debug, Error)]
pub enum CoreError {
    /// Request to the external API collaborator failed
    #[error("API error: {0}")]
    Api(#[from] crate::api::ApiError),

    /// Push channel failure
    #[error("Channel error: {0}")]
    Channel(#[from] crate::channel::ChannelError),

    /// Event could not be reconciled into the store
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] crate::reconcile::ReconcileError),

    /// Operation requires an active, subscribed session context
    #[error("Invalid lifecycle phase: {0}")]
    InvalidPhase(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
