//! Observable store events.
//!
//! Read paths degrade failures to absence. Every degraded failure is also
//! published here so callers can see what was swallowed.

use sealkv_crypto::KeySlot;
use serde::Serialize;
use tokio::sync::broadcast;

/// An event published by the key manager or the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    /// The active key was read from the vault.
    KeyLoaded { slot: KeySlot },

    /// A new key was generated and persisted.
    KeyGenerated { slot: KeySlot },

    /// A vault read failed or returned a malformed entry; treated as absent.
    VaultReadFailed { service: String, reason: String },

    /// One item of a batch read could not be decrypted; it resolves to `None`.
    ItemDecryptFailed { key: String, reason: String },

    /// An operation failed and was degraded to an empty result.
    Degraded {
        operation: &'static str,
        reason: String,
    },
}

/// Broadcast channel shared by a key manager and its store.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_and_receive() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.emit(StoreEvent::KeyGenerated {
            slot: KeySlot::Symmetric,
        });
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::KeyGenerated {
                slot: KeySlot::Symmetric
            }
        );
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(0);
        bus.emit(StoreEvent::KeyLoaded {
            slot: KeySlot::Asymmetric,
        });
    }

    #[test]
    fn test_event_serialization() {
        let event = StoreEvent::ItemDecryptFailed {
            key: "a".to_string(),
            reason: "authentication failed".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "item_decrypt_failed");
        assert_eq!(json["key"], "a");
    }
}
