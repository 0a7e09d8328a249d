//! Fan-out of payloads to live observers.
//!
//! A failing observer is dropped on the spot; delivery to the remaining
//! observers continues in registration order.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use eaf_core::{ConnectionId, SharedTelemetry};

use crate::payload::Payload;

const COMPONENT: &str = "broadcast";

#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error("observer disconnected")]
    Disconnected,

    #[error("observer queue full")]
    Full,

    #[error("send failed: {0}")]
    Send(String),
}

/// A live subscriber. Sends must not block the control loop.
pub trait Observer: Send {
    fn send(&mut self, message: &str) -> Result<(), ObserverError>;

    /// Closed observers are pruned before the next broadcast.
    fn is_open(&self) -> bool {
        true
    }
}

/// Observer backed by a crossbeam channel of JSON lines.
pub struct ChannelObserver {
    tx: Sender<String>,
}

impl ChannelObserver {
    pub fn unbounded() -> (Self, Receiver<String>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    /// A full queue counts as a failed send.
    pub fn bounded(capacity: usize) -> (Self, Receiver<String>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl Observer for ChannelObserver {
    fn send(&mut self, message: &str) -> Result<(), ObserverError> {
        self.tx.try_send(message.to_string()).map_err(|e| match e {
            TrySendError::Full(_) => ObserverError::Full,
            TrySendError::Disconnected(_) => ObserverError::Disconnected,
        })
    }
}

struct Connection {
    id: ConnectionId,
    observer: Box<dyn Observer>,
    delivered: u64,
}

/// Delivery summary for one broadcast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: Vec<ConnectionId>,
}

pub struct BroadcastManager {
    connections: Vec<Connection>,
    telemetry: SharedTelemetry,
}

impl BroadcastManager {
    pub fn new(telemetry: SharedTelemetry) -> Self {
        Self {
            connections: Vec::new(),
            telemetry,
        }
    }

    /// Add an observer and greet it with a `connection_status` payload.
    pub fn register(&mut self, observer: Box<dyn Observer>) -> ConnectionId {
        let id = ConnectionId::new();
        let mut connection = Connection {
            id,
            observer,
            delivered: 0,
        };

        match Payload::connected().to_json() {
            Ok(greeting) => match connection.observer.send(&greeting) {
                Ok(()) => connection.delivered += 1,
                Err(err) => {
                    self.telemetry.warn(
                        COMPONENT,
                        &format!("Observer {id} failed on connect: {err}"),
                    );
                    return id;
                }
            },
            Err(err) => self
                .telemetry
                .error(COMPONENT, &format!("Failed to encode greeting: {err}")),
        }

        self.connections.push(connection);
        tracing::debug!(connection_id = %id, total = self.connections.len(), "observer registered");
        self.telemetry.info(
            COMPONENT,
            &format!("Observer connected. Total connections: {}", self.connections.len()),
        );
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        let removed = self.connections.len() != before;
        if removed {
            self.telemetry.info(
                COMPONENT,
                &format!(
                    "Observer disconnected. Total connections: {}",
                    self.connections.len()
                ),
            );
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.iter().any(|c| c.id == id)
    }

    /// Messages delivered to `id` so far, greeting included.
    pub fn delivered(&self, id: ConnectionId) -> Option<u64> {
        self.connections
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.delivered)
    }

    /// Serialize once and send to every open observer.
    pub fn broadcast(&mut self, payload: &Payload) -> BroadcastReport {
        match payload.to_json() {
            Ok(message) => self.broadcast_text(&message),
            Err(err) => {
                self.telemetry.error(
                    COMPONENT,
                    &format!("Failed to encode {} payload: {err}", payload.kind()),
                );
                BroadcastReport::default()
            }
        }
    }

    pub fn broadcast_text(&mut self, message: &str) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        if self.connections.is_empty() {
            return report;
        }

        self.connections.retain(|c| {
            let open = c.observer.is_open();
            if !open {
                report.dropped.push(c.id);
            }
            open
        });

        let telemetry = &self.telemetry;
        self.connections.retain_mut(|c| match c.observer.send(message) {
            Ok(()) => {
                c.delivered += 1;
                report.delivered += 1;
                true
            }
            Err(err) => {
                telemetry.warn(
                    COMPONENT,
                    &format!("Failed to send to observer {}: {err}", c.id),
                );
                report.dropped.push(c.id);
                false
            }
        });

        if !report.dropped.is_empty() {
            tracing::debug!(
                dropped = report.dropped.len(),
                remaining = self.connections.len(),
                "observers dropped during broadcast"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eaf_core::RecordingTelemetry;

    struct FailingObserver;

    impl Observer for FailingObserver {
        fn send(&mut self, _message: &str) -> Result<(), ObserverError> {
            Err(ObserverError::Send("socket reset".to_string()))
        }
    }

    struct ClosedObserver;

    impl Observer for ClosedObserver {
        fn send(&mut self, _message: &str) -> Result<(), ObserverError> {
            Ok(())
        }

        fn is_open(&self) -> bool {
            false
        }
    }

    #[test]
    fn register_sends_greeting() {
        let mut manager = BroadcastManager::new(RecordingTelemetry::new());
        let (observer, rx) = ChannelObserver::unbounded();
        let id = manager.register(Box::new(observer));
        assert!(manager.contains(id));
        let greeting: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(greeting["type"], "connection_status");
        assert_eq!(manager.delivered(id), Some(1));
    }

    #[test]
    fn observer_failing_on_connect_is_not_kept() {
        let mut manager = BroadcastManager::new(RecordingTelemetry::new());
        let id = manager.register(Box::new(FailingObserver));
        assert!(!manager.contains(id));
        assert!(manager.is_empty());
    }

    #[test]
    fn one_failing_observer_does_not_affect_others() {
        let telemetry = RecordingTelemetry::new();
        let mut manager = BroadcastManager::new(telemetry.clone());
        let (a, rx_a) = ChannelObserver::unbounded();
        let (b, rx_b) = ChannelObserver::unbounded();
        manager.register(Box::new(a));
        let (c, rx_c) = ChannelObserver::unbounded();
        let c_id = manager.register(Box::new(c));
        manager.register(Box::new(b));
        drop(rx_c);

        for _ in 0..3 {
            manager.broadcast(&Payload::heartbeat(false));
        }

        assert!(!manager.contains(c_id));
        assert_eq!(manager.len(), 2);
        // greeting + three heartbeats
        assert_eq!(rx_a.try_iter().count(), 4);
        assert_eq!(rx_b.try_iter().count(), 4);
        assert!(telemetry.contains("Failed to send to observer"));
    }

    #[test]
    fn closed_observers_are_pruned() {
        let mut manager = BroadcastManager::new(RecordingTelemetry::new());
        let id = manager.register(Box::new(ClosedObserver));
        let report = manager.broadcast(&Payload::heartbeat(true));
        assert_eq!(report.delivered, 0);
        assert_eq!(report.dropped, vec![id]);
        assert!(manager.is_empty());
    }

    #[test]
    fn full_bounded_observer_is_dropped() {
        let mut manager = BroadcastManager::new(RecordingTelemetry::new());
        let (slow, _rx) = ChannelObserver::bounded(1);
        let id = manager.register(Box::new(slow));
        let report = manager.broadcast(&Payload::heartbeat(false));
        assert_eq!(report.dropped, vec![id]);
    }

    #[test]
    fn unregister_unknown_is_false() {
        let mut manager = BroadcastManager::new(RecordingTelemetry::new());
        assert!(!manager.unregister(ConnectionId::new()));
    }
}
