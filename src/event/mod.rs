mod bus;
mod events;
mod handlers;

pub use bus::Dispatcher;
pub use events::{AppEvent, EventKind};
pub use handlers::{EventQueue, Waker};

/// Receives dispatched events. Called on the dispatching thread.
pub trait EventHandler: Send + Sync {
    fn handle_event(&self, event: &AppEvent);
}
