//! Per-job completion events.
//!
//! Each job gets a watch channel on first use, by either side. A published
//! event stays readable for the retention window, so a subscriber that
//! connects after the callback already fired still receives it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use loyalty_primitives::notification::NotificationEvent;
use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug)]
struct Slot {
    sender: watch::Sender<Option<NotificationEvent>>,
    delivered_at: Option<Instant>,
}

impl Slot {
    fn new() -> Self {
        Self {
            sender: watch::Sender::new(None),
            delivered_at: None,
        }
    }

    fn expired(&self, retention: Duration, now: Instant) -> bool {
        if self.sender.receiver_count() > 0 {
            return false;
        }
        self.delivered_at
            .map_or(true, |at| now.duration_since(at) >= retention)
    }
}

#[derive(Clone, Debug)]
pub struct NotificationHub {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
    retention: Duration,
}

impl NotificationHub {
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            slots: Arc::default(),
            retention,
        }
    }

    /// Delivers the terminal event for `job`. Returns how many subscribers
    /// were waiting.
    pub fn publish(&self, job: &str, event: NotificationEvent) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        self.prune(&mut slots);

        let slot = slots.entry(job.to_owned()).or_insert_with(Slot::new);
        let _previous = slot.sender.send_replace(Some(event));
        slot.delivered_at = Some(Instant::now());

        let waiting = slot.sender.receiver_count();
        debug!(job, waiting, "Published pass notification");
        waiting
    }

    /// The receiver holds `Some` once the job's event has been published,
    /// possibly already on return.
    pub fn subscribe(&self, job: &str) -> watch::Receiver<Option<NotificationEvent>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        self.prune(&mut slots);

        slots
            .entry(job.to_owned())
            .or_insert_with(Slot::new)
            .sender
            .subscribe()
    }

    /// Jobs currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        self.prune(&mut slots);
        slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&self, slots: &mut HashMap<String, Slot>) {
        let now = Instant::now();
        slots.retain(|_, slot| !slot.expired(self.retention, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(url: &str) -> NotificationEvent {
        NotificationEvent::new(url.to_owned())
    }

    #[tokio::test]
    async fn subscriber_sees_later_event() {
        let hub = NotificationHub::new(Duration::from_secs(60));

        let mut receiver = hub.subscribe("card7-0xabc");
        assert!(receiver.borrow().is_none());

        assert_eq!(hub.publish("card7-0xabc", event("https://files.test/a")), 1);

        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), Some(event("https://files.test/a")));
    }

    #[tokio::test(start_paused = true)]
    async fn late_subscriber_within_retention() {
        let hub = NotificationHub::new(Duration::from_secs(60));

        assert_eq!(hub.publish("job", event("https://files.test/a")), 0);
        tokio::time::advance(Duration::from_secs(30)).await;

        let receiver = hub.subscribe("job");
        assert_eq!(*receiver.borrow(), Some(event("https://files.test/a")));
    }

    #[tokio::test(start_paused = true)]
    async fn delivered_events_expire() {
        let hub = NotificationHub::new(Duration::from_secs(60));

        let _waiting = hub.publish("job", event("https://files.test/a"));
        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(hub.is_empty());
        assert!(hub.subscribe("job").borrow().is_none());
    }

    #[tokio::test]
    async fn abandoned_subscriptions_are_dropped() {
        let hub = NotificationHub::new(Duration::from_secs(60));

        drop(hub.subscribe("job"));
        let other = hub.subscribe("other");

        assert_eq!(hub.len(), 1);
        drop(other);
        assert!(hub.is_empty());
    }

    #[tokio::test]
    async fn jobs_do_not_share_events() {
        let hub = NotificationHub::new(Duration::from_secs(60));

        let receiver = hub.subscribe("job-a");
        let _waiting = hub.publish("job-b", event("https://files.test/b"));

        assert!(receiver.borrow().is_none());
    }
}
