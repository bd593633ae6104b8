//! Broadcast channel that remembers its latest value.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// New subscribers first receive the latest published value, then every
/// value published after they subscribed.
pub struct ReplayChannel<T> {
    inner: Mutex<ReplayState<T>>,
}

struct ReplayState<T> {
    latest: Option<T>,
    subscribers: Vec<UnboundedSender<T>>,
    closed: bool,
}

impl<T> ReplayChannel<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ReplayState {
                latest: None,
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ReplayState<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ends every subscription; later publishes are ignored.
    pub fn close(&self) {
        let mut state = self.state();
        state.closed = true;
        state.subscribers.clear();
    }
}

impl<T: Clone> ReplayChannel<T> {
    pub fn with_value(value: T) -> Self {
        let channel = Self::new();
        channel.publish(value);
        channel
    }

    /// Stores `value` and sends it to every live subscriber.
    pub fn publish(&self, value: T) {
        let mut state = self.state();
        if state.closed {
            return;
        }
        state
            .subscribers
            .retain(|subscriber| subscriber.send(value.clone()).is_ok());
        state.latest = Some(value);
    }

    pub fn subscribe(&self) -> UnboundedReceiver<T> {
        let (sender, receiver) = unbounded_channel();
        let mut state = self.state();
        if state.closed {
            return receiver;
        }
        if let Some(latest) = &state.latest {
            let _ = sender.send(latest.clone());
        }
        state.subscribers.push(sender);
        receiver
    }
}

impl<T> Default for ReplayChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}
