//! In-process change notifications.
//!
//! The original app broadcast DOM events on `window` to make sibling screens
//! refetch after a mutation. Here that contract is an explicit bus: publish
//! is synchronous fan-out to every live subscriber of the topic, and
//! dropping a subscription stops delivery. No UI framework involved.

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTopic {
    Tasks,
    Medications,
}

type Callback = Box<dyn Fn(ChangeTopic) + Send>;

struct Subscriber {
    id: u64,
    /// `None` subscribes to every topic.
    topic: Option<ChangeTopic>,
    callback: Callback,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Cheap to clone; clones share the subscriber list.
#[derive(Clone, Default)]
pub struct ChangeBus {
    inner: Arc<Mutex<Inner>>,
}

/// Keeps the subscription alive; dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    inner: Arc<Mutex<Inner>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one topic, or to all of them with `topic = None`.
    pub fn subscribe<F>(&self, topic: Option<ChangeTopic>, callback: F) -> Subscription
    where
        F: Fn(ChangeTopic) + Send + 'static,
    {
        let mut inner = self.inner.lock().expect("bus lock poisoned");
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.push(Subscriber {
            id,
            topic,
            callback: Box::new(callback),
        });
        Subscription {
            id,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Notify every matching subscriber, in subscription order.
    pub fn publish(&self, topic: ChangeTopic) {
        let inner = self.inner.lock().expect("bus lock poisoned");
        for sub in &inner.subscribers {
            if sub.topic.is_none() || sub.topic == Some(topic) {
                (sub.callback)(topic);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().expect("bus lock poisoned").subscribers.len()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.subscribers.retain(|s| s.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn publish_reaches_topic_subscribers_only() {
        let bus = ChangeBus::new();
        let tasks_seen = Arc::new(AtomicUsize::new(0));
        let meds_seen = Arc::new(AtomicUsize::new(0));

        let t = Arc::clone(&tasks_seen);
        let _s1 = bus.subscribe(Some(ChangeTopic::Tasks), move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        });
        let m = Arc::clone(&meds_seen);
        let _s2 = bus.subscribe(Some(ChangeTopic::Medications), move |_| {
            m.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(ChangeTopic::Tasks);
        bus.publish(ChangeTopic::Tasks);
        bus.publish(ChangeTopic::Medications);

        assert_eq!(tasks_seen.load(Ordering::SeqCst), 2);
        assert_eq!(meds_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn wildcard_subscriber_sees_every_topic() {
        let bus = ChangeBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&seen);
        let _sub = bus.subscribe(None, move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(ChangeTopic::Tasks);
        bus.publish(ChangeTopic::Medications);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropping_the_subscription_stops_delivery() {
        let bus = ChangeBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&seen);
        let sub = bus.subscribe(Some(ChangeTopic::Tasks), move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(ChangeTopic::Tasks);
        drop(sub);
        bus.publish(ChangeTopic::Tasks);

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
