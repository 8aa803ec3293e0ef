//! External API collaborator seam
//!
//! The sync core never talks to a concrete backend; the surrounding
//! product supplies a [`SessionApi`] implementation. All calls here are
//! short-lived request/response operations with no retry policy of their
//! own (retries are the caller's responsibility; the optimistic manager
//! only handles rollback).

use async_trait::async_trait;
use shared::order::{OrderStatus, SessionSnapshot};
use thiserror::Error;

/// API collaborator error type
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Request failed (network, server-side, timeout)
    #[error("Request failed: {0}")]
    Request(String),

    /// Authentication rejected (bad PIN / unknown phone)
    #[error("Authentication rejected")]
    Unauthorized,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected as invalid
    #[error("Invalid request: {0}")]
    Invalid(String),
}

/// Authentication credential for session entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// 4-digit session PIN
    Pin(String),
    /// Registered phone number
    Phone(String),
}

/// Outcome of validating a table identifier
#[derive(Debug, Clone)]
pub enum TableValidation {
    /// An active session exists; full snapshot included
    Active(SessionSnapshot),
    /// No session exists; an external booking collaborator must supply one.
    /// The core takes no further action and never assumes a default session.
    NeedsBooking,
}

/// Request/response collaborator for session validation, authentication
/// and the two mutating actions initiated from this core.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Validate a table identifier and fetch the active session, if any
    async fn validate_table(&self, table_id: &str) -> Result<TableValidation, ApiError>;

    /// Authenticate into an existing session by PIN or phone number
    async fn authenticate(
        &self,
        table_id: &str,
        credential: &Credential,
    ) -> Result<SessionSnapshot, ApiError>;

    /// Fetch a fresh full snapshot (bootstrap and reconnect recovery)
    async fn fetch_snapshot(&self, session_id: &str) -> Result<SessionSnapshot, ApiError>;

    /// Submit a payment request for the session
    async fn request_payment(&self, session_id: &str) -> Result<(), ApiError>;

    /// Request an order status transition
    ///
    /// This is the explicit write path behind operator interactions that
    /// double as transition requests (e.g. the kitchen view expanding an
    /// order). The store is only moved by the resulting authoritative
    /// `ORDER_STATUS_UPDATED` event, never by this call succeeding.
    async fn request_transition(
        &self,
        session_id: &str,
        order_id: &str,
        target: OrderStatus,
    ) -> Result<(), ApiError>;
}
