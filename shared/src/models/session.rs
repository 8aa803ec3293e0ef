//! Session model - one active dining/ordering engagement

use serde::{Deserialize, Serialize};

/// Session status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

/// One active dining/ordering engagement bound to a physical table
/// or a delivery request.
///
/// At most one active session exists per table at a time; the server
/// enforces this, the client only ever holds the one it entered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Opaque session id (assigned by server)
    pub session_id: String,
    /// Table this session is bound to
    pub table_id: String,
    /// Customer display name
    pub customer_name: String,
    /// 4-digit authentication PIN
    pub pin: String,
    /// Running total across all non-superseded orders
    pub total_amount: f64,
    /// Whether a payment request has been issued for this session
    #[serde(default)]
    pub payment_requested: bool,
    /// Session status
    pub status: SessionStatus,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Session {
    /// Create a new active session
    pub fn new(
        session_id: impl Into<String>,
        table_id: impl Into<String>,
        customer_name: impl Into<String>,
        pin: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            table_id: table_id.into(),
            customer_name: customer_name.into(),
            pin: pin.into(),
            total_amount: 0.0,
            payment_requested: false,
            status: SessionStatus::Active,
            created_at: crate::util::now_millis(),
        }
    }

    /// Check if the session is still active
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Check if the session has completed
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}
