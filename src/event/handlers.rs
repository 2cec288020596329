use std::sync::Arc;

use async_channel::{Receiver, Sender};

use crate::event::{AppEvent, EventHandler};

/// Wakes whichever thread drains the queue, e.g. `egui::Context::request_repaint`
pub type Waker = Box<dyn Fn() + Send + Sync>;

/// Hands events over to a single consumer thread.
///
/// Producers may dispatch from any thread; the consumer drains the queue and
/// applies events one at a time, so model mutation stays single-threaded.
pub struct EventQueue {
    sender: Sender<AppEvent>,
    receiver: Receiver<AppEvent>,
    waker: Option<Waker>,
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.receiver.len())
            .finish()
    }
}

impl EventQueue {
    pub fn new() -> Arc<Self> {
        Self::build(None)
    }

    pub fn with_waker(waker: Waker) -> Arc<Self> {
        Self::build(Some(waker))
    }

    fn build(waker: Option<Waker>) -> Arc<Self> {
        let (sender, receiver) = async_channel::unbounded();
        Arc::new(Self {
            sender,
            receiver,
            waker,
        })
    }

    /// Takes every event queued so far, oldest first
    pub fn drain(&self) -> Vec<AppEvent> {
        std::iter::from_fn(|| self.receiver.try_recv().ok()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl EventHandler for EventQueue {
    fn handle_event(&self, event: &AppEvent) {
        // Unbounded and we hold the receiver, so this cannot fail
        if self.sender.try_send(event.clone()).is_err() {
            log::warn!("Event queue closed, dropping {}", event.name());
            return;
        }
        if let Some(waker) = &self.waker {
            waker();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Dispatcher, EventKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_queue_preserves_order_and_wakes() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        let queue = EventQueue::with_waker(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let dispatcher = Dispatcher::new();
        dispatcher.add_listener(queue.clone());
        dispatcher.dispatch_event(AppEvent::new(EventKind::ProgressStarted));
        dispatcher.dispatch_event(AppEvent::log("hello"));

        let names: Vec<_> = queue.drain().iter().map(AppEvent::name).collect();
        assert_eq!(names, ["ProgressStarted", "Log"]);
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cross_thread_dispatch() {
        let queue = EventQueue::new();
        let dispatcher = Arc::new(Dispatcher::new());
        dispatcher.add_listener(queue.clone());

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let dispatcher = Arc::clone(&dispatcher);
                std::thread::spawn(move || dispatcher.dispatch_event(AppEvent::log(format!("worker {i}"))))
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(queue.drain().len(), 4);
    }
}
