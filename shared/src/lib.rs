//! Shared types for the Mesa order synchronization core
//!
//! Common types used across the sync core and its rendering/API
//! collaborators: session and order models, push-channel event types,
//! and the status vocabulary translator.

pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Convenience re-exports for the most commonly used types
pub use models::{Session, SessionStatus};
pub use order::{
    EventPayload, OrderItemSnapshot, OrderSnapshot, OrderStatus, ServiceChannel, SessionSnapshot,
    StatusEvent, StatusView,
};
