//! In-memory event bus.

use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("event bus lock poisoned")]
    Poisoned,

    /// The bus was closed; nothing can be published any more.
    #[error("event bus closed")]
    Closed,
}

/// In-memory pub/sub bus.
///
/// - No IO / no async
/// - Fan-out to every live subscriber; dropped subscriptions are pruned on publish
/// - `close()` disconnects all subscribers
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Option<Vec<mpsc::Sender<M>>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disconnect every subscriber and refuse further publishes.
    ///
    /// Subscribers observe `Disconnected` once they have drained what was
    /// already queued.
    pub fn close(&self) {
        if let Ok(mut subs) = self.subscribers.lock() {
            if let Some(senders) = subs.take() {
                tracing::debug!(subscribers = senders.len(), "event bus closed");
            }
        }
    }

    /// Number of live subscribers as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .ok()
            .and_then(|subs| subs.as_ref().map(Vec::len))
            .unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Some(Vec::new())),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut guard = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        let subs = guard.as_mut().ok_or(InMemoryBusError::Closed)?;

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A closed or poisoned bus still hands out a subscription; `tx` is
        // dropped here so the receiver reports `Disconnected` right away.
        if let Ok(mut subs) = self.subscribers.lock() {
            if let Some(subs) = subs.as_mut() {
                subs.push(tx);
            }
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::TryRecvError;

    use super::*;

    #[test]
    fn fans_out_to_every_subscriber() {
        let bus = InMemoryEventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(1u32).unwrap();
        bus.publish(2u32).unwrap();

        assert_eq!(a.drain(), vec![1, 2]);
        assert_eq!(b.drain(), vec![1, 2]);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = InMemoryEventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());

        bus.publish("x").unwrap();

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_recv().unwrap(), "x");
    }

    #[test]
    fn close_disconnects_and_rejects_publish() {
        let bus = InMemoryEventBus::new();
        let sub = bus.subscribe();
        bus.publish(5u8).unwrap();

        bus.close();

        assert_eq!(sub.try_recv().unwrap(), 5);
        assert_eq!(sub.try_recv(), Err(TryRecvError::Disconnected));
        assert_eq!(bus.publish(6u8), Err(InMemoryBusError::Closed));

        let late = bus.subscribe();
        assert_eq!(late.try_recv(), Err(TryRecvError::Disconnected));
    }
}
