use std::sync::mpsc::{channel, Receiver, Sender};

use uuid::Uuid;

use crate::capture::SessionState;

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    MeshPublished(Uuid),
    TextureApplied(Uuid),
    TextureUnavailable(Uuid),
    BakeFailed(Uuid, String),
}

/// Fans session events out to every live subscriber.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SessionEvent>>,
}

impl EventBus {
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    pub fn publish(&mut self, event: SessionEvent) {
        // Subscribers whose receiver is gone are dropped.
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn num_subscribers(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish() {
        let mut bus = EventBus::default();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.publish(SessionEvent::StateChanged(SessionState::Capturing));
        let expected = SessionEvent::StateChanged(SessionState::Capturing);
        assert_eq!(first.try_recv().unwrap(), expected);
        assert_eq!(second.try_recv().unwrap(), expected);

        drop(first);
        bus.publish(SessionEvent::StateChanged(SessionState::Idle));
        assert_eq!(bus.num_subscribers(), 1);
        assert_eq!(
            second.try_recv().unwrap(),
            SessionEvent::StateChanged(SessionState::Idle)
        );
    }
}
