// SPDX-License-Identifier: Apache-2.0

use flume::{Receiver, Sender, TrySendError};
use std::fmt;
use std::time::Duration;

pub struct BoundedSender<T> {
    tx: Sender<T>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SendError {
    Disconnected,
    Full,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Disconnected => write!(f, "channel disconnected"),
            SendError::Full => write!(f, "channel full"),
        }
    }
}

impl std::error::Error for SendError {}

impl<T> BoundedSender<T> {
    /// Blocking send - blocks until there is capacity in the channel.
    /// Use this from non-async contexts (e.g., the tail loop thread).
    pub fn send_blocking(&self, item: T) -> Result<(), SendError> {
        match self.tx.send(item) {
            Ok(()) => Ok(()),
            Err(_e) => Err(SendError::Disconnected), // receiver closed
        }
    }

    /// Non-blocking send - fails with `SendError::Full` when at capacity.
    pub fn try_send(&self, item: T) -> Result<(), SendError> {
        match self.tx.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SendError::Full),
            Err(TrySendError::Disconnected(_)) => Err(SendError::Disconnected),
        }
    }
}

impl<T> Clone for BoundedSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

#[derive(Clone)]
pub struct BoundedReceiver<T> {
    rx: Receiver<T>,
}

impl<T> BoundedReceiver<T> {
    pub async fn next(&mut self) -> Option<T> {
        match self.rx.recv_async().await {
            Ok(item) => Some(item),
            Err(_e) => None, // disconnected
        }
    }

    /// Blocking receive - blocks until an item is available.
    pub fn recv_blocking(&self) -> Option<T> {
        match self.rx.recv() {
            Ok(item) => Some(item),
            Err(_e) => None, // disconnected
        }
    }

    /// Non-blocking receive - returns immediately.
    /// Returns None if no item is available or channel is disconnected.
    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Blocking receive with timeout - blocks until an item is available or timeout.
    /// Returns None if timeout expires or channel is disconnected.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain everything currently queued without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.rx.drain().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

pub fn bounded<T>(size: usize) -> (BoundedSender<T>, BoundedReceiver<T>) {
    let (tx, rx) = flume::bounded::<T>(size);

    let sender = BoundedSender { tx };
    let receiver = BoundedReceiver { rx };

    (sender, receiver)
}

#[cfg(test)]
mod tests {
    use super::{SendError, bounded};
    use std::time::Duration;
    use tokio_test::{assert_ok, assert_pending, assert_ready, task::spawn};

    #[tokio::test]
    async fn basics() {
        let (tx, mut rx) = bounded(3);

        let msg = 10;

        let mut recv1 = spawn(async { rx.next().await });
        assert!(!recv1.is_woken());
        assert_pending!(recv1.poll());

        assert_ok!(tx.send_blocking(msg));

        assert!(recv1.is_woken());
        assert_eq!(Some(msg), assert_ready!(recv1.poll()));

        drop(recv1);

        let mut recv2 = spawn(async { rx.next().await });

        drop(tx);
        // receives None since send channel was closed
        assert_eq!(None, assert_ready!(recv2.poll()));
    }

    #[test]
    fn try_send_reports_full() {
        let (tx, rx) = bounded(1);

        assert_eq!(Ok(()), tx.try_send(1));
        assert_eq!(Err(SendError::Full), tx.try_send(2));

        assert_eq!(Some(1), rx.try_recv());
        assert_eq!(Ok(()), tx.try_send(3));
    }

    #[test]
    fn blocking_send_fails_on_rx_close() {
        let (tx, rx) = bounded(1);
        drop(rx);

        assert_eq!(Err(SendError::Disconnected), tx.send_blocking(10));
    }

    #[test]
    fn recv_timeout_returns_none_when_idle() {
        let (_tx, rx) = bounded::<u32>(1);
        assert_eq!(None, rx.recv_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn drain_collects_in_order() {
        let (tx, rx) = bounded(4);
        for i in 0..3 {
            tx.send_blocking(i).unwrap();
        }

        assert_eq!(vec![0, 1, 2], rx.drain());
        assert!(rx.is_empty());
    }
}
