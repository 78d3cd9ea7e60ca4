//! # Event Bus Capability
//!
//! In-process publish/subscribe keyed by event name. Listeners run
//! synchronously on the emitting thread, in registration order.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Named-event dispatcher.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        let mut events: Vec<_> = listeners.keys().collect();
        events.sort();
        f.debug_struct("EventBus").field("events", &events).finish()
    }
}

impl EventBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `event`.
    pub fn on(&self, event: &str, listener: impl Fn(&Value) + Send + Sync + 'static) {
        self.listeners
            .write()
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(listener));
    }

    /// Delivers `payload` to every listener of `event`; returns how many ran.
    pub fn emit(&self, event: &str, payload: Value) -> usize {
        // Listeners are cloned out so they may register further listeners.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .get(event)
            .cloned()
            .unwrap_or_default();

        for listener in &listeners {
            listener(&payload);
        }
        debug!(event, delivered = listeners.len(), "event emitted");
        listeners.len()
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }
}

/// The process-wide bus shared by all handlers.
pub fn bus() -> &'static EventBus {
    static BUS: OnceLock<EventBus> = OnceLock::new();
    BUS.get_or_init(EventBus::new)
}
