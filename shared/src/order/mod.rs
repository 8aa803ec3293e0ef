//! Order types shared between the sync core and its collaborators
//!
//! - **status**: raw status codes, the two channel vocabularies and the
//!   display translator
//! - **item**: order line items with cancellation/return accounting
//! - **snapshot**: order snapshots as held by the client store
//! - **event**: push-channel status events (wire format)

pub mod event;
pub mod item;
pub mod snapshot;
pub mod status;

pub use event::{EventPayload, StatusEvent};
pub use item::{AdjustmentKind, ItemModifiers, OrderItemSnapshot};
pub use snapshot::{FulfillmentInfo, OrderSnapshot, SessionSnapshot};
pub use status::{OrderStatus, ServiceChannel, StatusView, translate};
