//! Change notifications between screens.
//!
//! Screens that care about the task list hold a receiver from
//! [`EventBus::subscribe`]; screens that change the list post to the same
//! bus. Events carry no payload. Delivery is fire-and-forget: only receivers
//! registered when an event is posted see it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::trace;

/// Something happened to the stored task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskEvent {
    /// A task was changed in place.
    Updated,
    /// A task was removed.
    Deleted,
}

impl TaskEvent {
    pub fn name(self) -> &'static str {
        match self {
            TaskEvent::Updated => "TodoItemUpdated",
            TaskEvent::Deleted => "TodoItemDeleted",
        }
    }
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared publish/subscribe handle. Clones post to the same subscribers.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Rc<RefCell<Vec<Sender<TaskEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        Subscription { rx }
    }

    /// Deliver `event` to every live subscriber and return how many got it.
    ///
    /// Subscribers whose receiving end has been dropped are forgotten.
    pub fn post(&self, event: TaskEvent) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|tx| tx.send(event).is_ok());
        trace!(%event, delivered = subscribers.len(), "posted task event");
        subscribers.len()
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

/// Receiving end of an [`EventBus`] registration.
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<TaskEvent>,
}

impl Subscription {
    /// Take every pending event without blocking.
    pub fn drain(&self) -> Vec<TaskEvent> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_reaches_every_subscriber() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.clone().subscribe();

        assert_eq!(bus.post(TaskEvent::Updated), 2);
        assert_eq!(a.drain(), vec![TaskEvent::Updated]);
        assert_eq!(b.drain(), vec![TaskEvent::Updated]);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new();
        bus.post(TaskEvent::Deleted);
        let late = bus.subscribe();
        assert!(late.drain().is_empty());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(bus.post(TaskEvent::Deleted), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.drain(), vec![TaskEvent::Deleted]);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(TaskEvent::Updated.to_string(), "TodoItemUpdated");
        assert_eq!(TaskEvent::Deleted.name(), "TodoItemDeleted");
    }
}
