//! Subscriber lifecycle registry.
//!
//! Membership is owned exclusively by the state manager; subscribers
//! themselves only carry opaque delivery handles (broadcast receivers).
//! Lifecycle per subscriber: `Connected → Active → Closing → Closed`,
//! where `Closed` is terminal and means removal from the set. Removal on
//! delivery failure is the only lifecycle event besides a clean goodbye.

use std::collections::HashMap;

use tracing::debug;

/// Live phases of a subscriber. `Closed` is represented by absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberPhase {
    /// Accepted, initial snapshot not yet delivered.
    Connected,
    /// Receiving the prediction stream.
    Active,
    /// Delivery error or peer close observed; cleanup pending.
    Closing,
}

/// Registry of active subscriber handles.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    next_id: u64,
    subscribers: HashMap<u64, SubscriberPhase>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new subscriber in the `Connected` phase.
    pub fn register(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, SubscriberPhase::Connected);
        debug!(subscriber_id = id, "Subscriber connected");
        id
    }

    /// `Connected → Active` once the initial snapshot is delivered.
    pub fn activate(&mut self, id: u64) -> bool {
        match self.subscribers.get_mut(&id) {
            Some(phase @ SubscriberPhase::Connected) => {
                *phase = SubscriberPhase::Active;
                true
            }
            _ => false,
        }
    }

    /// `→ Closing` on delivery error or peer close.
    pub fn begin_close(&mut self, id: u64) -> bool {
        match self.subscribers.get_mut(&id) {
            Some(phase) if *phase != SubscriberPhase::Closing => {
                *phase = SubscriberPhase::Closing;
                debug!(subscriber_id = id, "Subscriber closing");
                true
            }
            _ => false,
        }
    }

    /// `Closing → Closed`: drop the handle from the set. Terminal.
    pub fn remove(&mut self, id: u64) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            debug!(subscriber_id = id, "Subscriber closed");
        }
        removed
    }

    pub fn phase(&self, id: u64) -> Option<SubscriberPhase> {
        self.subscribers.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_runs_connected_active_closing_closed() {
        let mut registry = SubscriberRegistry::new();
        let id = registry.register();
        assert_eq!(registry.phase(id), Some(SubscriberPhase::Connected));

        assert!(registry.activate(id));
        assert_eq!(registry.phase(id), Some(SubscriberPhase::Active));

        assert!(registry.begin_close(id));
        assert_eq!(registry.phase(id), Some(SubscriberPhase::Closing));

        assert!(registry.remove(id));
        assert_eq!(registry.phase(id), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn activate_requires_connected_phase() {
        let mut registry = SubscriberRegistry::new();
        let id = registry.register();
        assert!(registry.activate(id));
        // Already active; a second activation is a no-op.
        assert!(!registry.activate(id));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = SubscriberRegistry::new();
        let id = registry.register();
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
    }

    #[test]
    fn ids_are_unique() {
        let mut registry = SubscriberRegistry::new();
        let a = registry.register();
        let b = registry.register();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }
}
