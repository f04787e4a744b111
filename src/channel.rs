//! Replay-latest broadcast channel.
//!
//! A [`ChangeChannel`] always holds a current value. Publishing replaces that
//! value and notifies every active subscriber; a new subscriber's first
//! receive is the most recent published value (or the seed), then every
//! subsequent publish. The channel remembers exactly one value: a subscriber
//! that falls behind observes only the latest state, never a backlog.
//!
//! Built on [`tokio::sync::watch`], so publishing never blocks and succeeds
//! even with zero subscribers.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A broadcast channel holding a current value of type `V`.
pub struct ChangeChannel<V> {
    tx: Arc<watch::Sender<V>>,
}

impl<V> ChangeChannel<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new channel seeded with an initial value.
    ///
    /// The seed is what subscribers receive first until the first
    /// [`publish`](Self::publish).
    pub fn new(seed: V) -> Self {
        let (tx, _rx) = watch::channel(seed);
        Self { tx: Arc::new(tx) }
    }

    /// Set the current value and notify every active subscriber.
    pub fn publish(&self, value: V) {
        self.tx.send_replace(value);
    }

    /// Atomically derive the next value from the current one and publish it.
    ///
    /// The closure runs under the channel's internal lock, so concurrent
    /// updates never interleave.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut V),
    {
        self.tx.send_modify(f);
    }

    /// Get a clone of the current value.
    pub fn current(&self) -> V {
        self.tx.borrow().clone()
    }

    /// Register a subscriber.
    ///
    /// The subscription's first [`recv`](Subscription::recv) resolves
    /// immediately with the current value; subsequent calls resolve with each
    /// later publish.
    pub fn subscribe(&self) -> Subscription<V> {
        let mut rx = self.tx.subscribe();
        // A fresh receiver considers the current value already seen; mark it
        // so the first recv replays it.
        rx.mark_changed();
        Subscription { rx }
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<V> Clone for ChangeChannel<V> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<V> fmt::Debug for ChangeChannel<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeChannel")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

/// A live subscription to a [`ChangeChannel`].
///
/// Dropping the subscription detaches it from the channel; no further values
/// are delivered.
pub struct Subscription<V> {
    rx: watch::Receiver<V>,
}

impl<V> Subscription<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Wait for the next value.
    ///
    /// The first call after subscribing resolves immediately with the value
    /// current at subscription time. Returns `None` once the channel has been
    /// dropped and no unseen value remains.
    pub async fn recv(&mut self) -> Option<V> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Peek at the channel's current value without consuming a notification.
    pub fn latest(&self) -> V {
        self.rx.borrow().clone()
    }

    /// Detach from the channel. Dropping the subscription has the same
    /// effect; detaching twice is not representable.
    pub fn unsubscribe(self) {}

    /// Convert into a [`Stream`](futures::Stream) of values.
    ///
    /// The stream yields the current value first, then every later publish.
    pub fn into_stream(self) -> WatchStream<V> {
        WatchStream::new(self.rx)
    }
}

impl<V> fmt::Debug for Subscription<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_subscribe_replays_seed() {
        tokio_test::block_on(async {
            let channel = ChangeChannel::new(0u32);
            let mut sub = channel.subscribe();
            assert_eq!(sub.recv().await, Some(0));
        });
    }

    #[test]
    fn test_subscribe_replays_latest_publish() {
        tokio_test::block_on(async {
            let channel = ChangeChannel::new(0u32);
            channel.publish(1);
            channel.publish(2);

            // Late subscriber sees only the most recent value first.
            let mut sub = channel.subscribe();
            assert_eq!(sub.recv().await, Some(2));

            channel.publish(3);
            assert_eq!(sub.recv().await, Some(3));
        });
    }

    #[test]
    fn test_slow_subscriber_observes_latest_only() {
        tokio_test::block_on(async {
            let channel = ChangeChannel::new(0u32);
            let mut sub = channel.subscribe();
            assert_eq!(sub.recv().await, Some(0));

            // Three publishes before the subscriber polls again: only the
            // latest is delivered.
            channel.publish(1);
            channel.publish(2);
            channel.publish(3);
            assert_eq!(sub.recv().await, Some(3));
        });
    }

    #[test]
    fn test_publish_without_subscribers() {
        let channel = ChangeChannel::new("init".to_string());
        channel.publish("add".to_string());
        assert_eq!(channel.current(), "add");
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_detaches() {
        let channel = ChangeChannel::new(0u32);
        let sub = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 1);
        sub.unsubscribe();
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_update_derives_from_current() {
        let channel = ChangeChannel::new(10u32);
        channel.update(|v| *v += 5);
        assert_eq!(channel.current(), 15);
    }

    #[test]
    fn test_into_stream_yields_current_then_changes() {
        tokio_test::block_on(async {
            let channel = ChangeChannel::new(1u32);
            let mut stream = channel.subscribe().into_stream();

            assert_eq!(stream.next().await, Some(1));
            channel.publish(2);
            assert_eq!(stream.next().await, Some(2));
        });
    }

    #[test]
    fn test_channel_clones_share_state() {
        let channel = ChangeChannel::new(0u32);
        let other = channel.clone();
        other.publish(7);
        assert_eq!(channel.current(), 7);
    }
}
