use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{AppEvent, EventHandler};

/// Broadcasts application events to registered handlers.
///
/// Delivery is synchronous and in registration order, on whichever thread
/// calls [`Dispatcher::dispatch_event`]. Handlers that touch UI state must hand
/// the event over to the UI thread themselves.
///
/// Registering the same handler twice makes it receive every event twice.
pub struct Dispatcher {
    handlers: Mutex<Vec<Arc<dyn EventHandler>>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &format!("<{} handlers>", self.handlers.lock().len()))
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe a handler to receive events
    pub fn add_listener(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.lock().push(handler);
    }

    /// Removes the earliest registration of `handler`, compared by pointer.
    /// Unknown handlers are ignored.
    pub fn remove_listener(&self, handler: &Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.lock();
        if let Some(index) = handlers.iter().position(|h| Arc::ptr_eq(h, handler)) {
            handlers.remove(index);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Delivers `event` to every handler registered at the time of the call.
    /// With no handlers the event is dropped.
    pub fn dispatch_event(&self, event: AppEvent) {
        // Snapshot so handlers may (un)subscribe while handling
        let handlers: Vec<Arc<dyn EventHandler>> = self.handlers.lock().clone();
        log::trace!("Dispatching {} to {} handlers", event.name(), handlers.len());
        for handler in &handlers {
            handler.handle_event(&event);
        }
    }
}
