//! Ordered completion of fake requests.
//!
//! A fake data source calls [`ReleaseGate::wait`] with a key before answering;
//! the test decides the completion order by calling [`ReleaseGate::release`].
//! Either side may arrive first.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

#[derive(Default)]
struct Slots {
    senders: HashMap<String, oneshot::Sender<()>>,
    receivers: HashMap<String, oneshot::Receiver<()>>,
    released: HashSet<String>,
}

impl Slots {
    fn ensure(&mut self, key: &str) {
        if !self.released.contains(key)
            && !self.senders.contains_key(key)
            && !self.receivers.contains_key(key)
        {
            let (tx, rx) = oneshot::channel();
            self.senders.insert(key.to_string(), tx);
            self.receivers.insert(key.to_string(), rx);
        }
    }
}

/// Keyed one-shot release points.
#[derive(Default)]
pub struct ReleaseGate {
    slots: Mutex<Slots>,
}

impl ReleaseGate {
    /// Create an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `key` is released. Returns immediately if it already was.
    pub async fn wait(&self, key: &str) {
        let receiver = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.ensure(key);
            slots.receivers.remove(key)
        };
        if let Some(receiver) = receiver {
            let _ = receiver.await;
        }
    }

    /// Release `key`. Returns `false` when it was already released.
    pub fn release(&self, key: &str) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.ensure(key);
        match slots.senders.remove(key) {
            Some(sender) => {
                let _ = sender.send(());
                slots.released.insert(key.to_string());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn release_before_wait_does_not_block() {
        let gate = ReleaseGate::new();
        assert!(gate.release("a"));
        gate.wait("a").await;
        assert!(!gate.release("a"));
    }

    #[tokio::test]
    async fn waiters_complete_in_release_order() {
        let gate = Arc::new(ReleaseGate::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for key in ["first", "second"] {
            let gate = Arc::clone(&gate);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                gate.wait(key).await;
                order.lock().unwrap().push(key);
            }));
        }

        tokio::task::yield_now().await;
        gate.release("second");
        handles.pop().unwrap().await.unwrap();
        gate.release("first");
        handles.pop().unwrap().await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["second", "first"]);
    }
}
