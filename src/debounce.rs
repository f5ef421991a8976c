//! Input debouncing for search-as-you-type.
//!
//! Values pushed within the quiet window replace each other; the action only
//! sees the last one, once input has paused for the full window.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_QUIET: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the debounce loop on the current runtime.
    ///
    /// Dropping every handle flushes a pending value before the loop exits.
    pub fn spawn<F, Fut>(quiet: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            None => break,
                        },
                        () = tokio::time::sleep(quiet) => break,
                    }
                }
                action(latest).await;
            }
            tracing::debug!("debouncer closed");
        });
        Self { tx }
    }

    /// Queues a value. Returns `false` if the loop has already stopped.
    pub fn push(&self, value: T) -> bool { self.tx.send(value).is_ok() }
}
