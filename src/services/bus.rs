use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::AlertEvent;

/// Event published by the alert transport
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Alert(AlertEvent),
}

/// Subscription channel for transport events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    GigAlert,
    ApplicationUpdate,
    SystemNotification,
}

impl TransportEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TransportEvent::Connected => EventKind::Connected,
            TransportEvent::Disconnected => EventKind::Disconnected,
            TransportEvent::Alert(AlertEvent::GigAlert(_)) => EventKind::GigAlert,
            TransportEvent::Alert(AlertEvent::ApplicationUpdate(_)) => EventKind::ApplicationUpdate,
            TransportEvent::Alert(AlertEvent::SystemNotification(_)) => {
                EventKind::SystemNotification
            }
        }
    }
}

/// Handle returned by `on`, used to unregister with `off`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

type Handler = Arc<dyn Fn(&TransportEvent) + Send + Sync>;

/// In-process publish/subscribe registry for transport events.
///
/// Handlers for an event kind run synchronously on the emitting context,
/// in registration order. A handler that panics is caught and logged so
/// the remaining handlers for the same emission still run.
pub struct EventBus {
    handlers: Mutex<HashMap<EventKind, Vec<(HandlerId, Handler)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler for one event kind
    pub fn on<F>(&self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&TransportEvent) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut handlers = self.handlers.lock().expect("bus lock poisoned");
        handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Unregister a handler. Unknown ids are ignored.
    pub fn off(&self, id: HandlerId) {
        let mut handlers = self.handlers.lock().expect("bus lock poisoned");
        for list in handlers.values_mut() {
            list.retain(|(handler_id, _)| *handler_id != id);
        }
    }

    /// Deliver an event to every handler registered for its kind, FIFO.
    pub fn emit(&self, event: &TransportEvent) {
        let kind = event.kind();

        // Clone the handler list out of the lock so a handler that calls
        // on/off re-entrantly cannot deadlock the registry.
        let snapshot: Vec<Handler> = {
            let handlers = self.handlers.lock().expect("bus lock poisoned");
            handlers
                .get(&kind)
                .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };

        for handler in snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                tracing::error!("event handler panicked for {:?}", kind);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
