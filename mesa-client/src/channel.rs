//! Push-channel abstraction
//!
//! The transport itself (sockets, TLS, reconnect backoff) is assumed to be
//! provided by the surrounding product as a reliable reconnecting pub/sub
//! channel. This module defines the subscription seam the sync core
//! consumes, plus an in-memory implementation used by tests and demos.
//!
//! Delivery is at-most-once per event id; the reconciler additionally
//! dedups by event id as defense in depth.

use async_trait::async_trait;
use shared::order::StatusEvent;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::broadcast;

/// Channel buffer for subscribed topics
const TOPIC_CHANNEL_CAPACITY: usize = 1024;

/// Channel error type
///
/// A closed transport is not an error here: it surfaces as
/// `RecvError::Closed` on the subscription's receivers.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Subscription could not be established
    #[error("Subscribe failed: {0}")]
    Subscribe(String),
}

/// Transport connectivity notifications
///
/// `Reconnected` means the transport re-established the link; events missed
/// during the disconnect window are unrecoverable (there is no gap-fill
/// protocol), so consumers must re-fetch a full snapshot before resuming
/// incremental reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Disconnected,
    Reconnected,
}

/// A live subscription to one session-scoped topic
pub struct Subscription {
    /// Status events published on the topic
    pub events: broadcast::Receiver<StatusEvent>,
    /// Transport connectivity notifications
    pub connection: broadcast::Receiver<ConnectionEvent>,
    /// Topic this subscription is bound to
    pub topic: String,
}

/// Pub/sub channel seam consumed by the session lifecycle
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Join a topic; events published before the subscription completes
    /// are not delivered.
    async fn subscribe(&self, topic: &str) -> Result<Subscription, ChannelError>;
}

/// Topic naming: one topic per session
pub fn session_topic(session_id: &str) -> String {
    format!("session:{session_id}")
}

/// In-memory channel for tests and demos
///
/// Fan-out per topic via `tokio::sync::broadcast`; dropping the
/// subscription's receiver is the unsubscribe.
#[derive(Debug)]
pub struct MemoryChannel {
    topics: parking_lot::Mutex<HashMap<String, broadcast::Sender<StatusEvent>>>,
    connection_tx: broadcast::Sender<ConnectionEvent>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        let (connection_tx, _) = broadcast::channel(16);
        Self {
            topics: parking_lot::Mutex::new(HashMap::new()),
            connection_tx,
        }
    }

    fn topic_sender(&self, topic: &str) -> broadcast::Sender<StatusEvent> {
        let mut topics = self.topics.lock();
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Publish an event to a topic; returns the number of subscribers
    /// that received it.
    pub fn publish(&self, topic: &str, event: StatusEvent) -> usize {
        self.topic_sender(topic).send(event).unwrap_or(0)
    }

    /// Simulate a transport connectivity change
    pub fn emit_connection(&self, event: ConnectionEvent) {
        let _ = self.connection_tx.send(event);
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventChannel for MemoryChannel {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, ChannelError> {
        let events = self.topic_sender(topic).subscribe();
        let connection = self.connection_tx.subscribe();
        tracing::debug!(topic = %topic, "Subscribed to topic");
        Ok(Subscription {
            events,
            connection,
            topic: topic.to_string(),
        })
    }
}
