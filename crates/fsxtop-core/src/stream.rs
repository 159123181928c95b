// ── Change notification ──
//
// Edge-triggered "something changed" signal from the controllers to the
// display. The signal carries no payload: consumers re-read the current
// snapshot, so collapsed or missed signals lose nothing.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Sending half, owned by a controller.
#[derive(Debug)]
pub(crate) struct ChangeSignal {
    version: watch::Sender<u64>,
}

impl ChangeSignal {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self { version }
    }

    /// Bump the version and wake every subscriber.
    pub(crate) fn notify(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    pub(crate) fn subscribe(&self) -> ChangeStream {
        ChangeStream::new(self.version.subscribe())
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }
}

/// A subscription to a controller's change signal.
pub struct ChangeStream {
    receiver: watch::Receiver<u64>,
}

impl ChangeStream {
    fn new(mut receiver: watch::Receiver<u64>) -> Self {
        receiver.mark_unchanged();
        Self { receiver }
    }

    /// Version seen by the last `changed()` (or at subscription).
    pub fn version(&self) -> u64 {
        *self.receiver.borrow()
    }

    /// Wait for the next change. Returns `false` once the controller
    /// has been dropped.
    pub async fn changed(&mut self) -> bool {
        if self.receiver.changed().await.is_err() {
            return false;
        }
        self.receiver.borrow_and_update();
        true
    }

    /// Convert into a `Stream` yielding the version on each change,
    /// starting with the current one.
    pub fn into_stream(self) -> ChangeWatchStream {
        ChangeWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by the signal's `watch::Receiver`.
pub struct ChangeWatchStream {
    inner: WatchStream<u64>,
}

impl Stream for ChangeWatchStream {
    type Item = u64;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
