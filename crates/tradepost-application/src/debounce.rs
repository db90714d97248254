//! Trailing-edge debouncing for text-driven filter inputs.
//!
//! Rapid keystrokes produce one filter application after a quiet period,
//! purely to cut recomputation; correctness never depends on it.

use std::time::Duration;

use tokio::sync::{mpsc, watch};

/// Input half of a debounced channel.
///
/// Every [`Debouncer::update`] restarts the quiet period; once it elapses
/// the latest value is published on the paired watch channel. Values
/// superseded within the quiet period are never published. Dropping the
/// debouncer discards any value still waiting.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
}

impl<T: Send + Sync + 'static> Debouncer<T> {
    /// Creates a debouncer and the output it publishes to.
    ///
    /// The output starts at `None` and holds the most recently settled
    /// value afterwards.
    pub fn new(quiet_period: Duration) -> (Self, watch::Receiver<Option<T>>) {
        let (input, mut pending_rx) = mpsc::unbounded_channel::<T>();
        let (output, settled) = watch::channel(None);

        tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                if pending.is_none() {
                    // idle: block until there is something to settle
                    match pending_rx.recv().await {
                        Some(value) => pending = Some(value),
                        None => break,
                    }
                }

                tokio::select! {
                    newer = pending_rx.recv() => match newer {
                        Some(value) => pending = Some(value),
                        None => break,
                    },
                    _ = tokio::time::sleep(quiet_period) => {
                        if output.send(pending.take()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        (Self { input }, settled)
    }

    /// Feeds a new value, restarting the quiet period.
    pub fn update(&self, value: T) {
        // receiver only goes away when the task ends; nothing to do then
        let _ = self.input.send(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_within_quiet_period_settles() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_millis(300));

        debouncer.update("h".to_string());
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        debouncer.update("ha".to_string());
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        debouncer.update("haifa".to_string());
        tokio::task::yield_now().await;

        // quiet period not yet elapsed since the last keystroke
        tokio::time::advance(Duration::from_millis(299)).await;
        assert!(settled.borrow_and_update().is_none());

        tokio::time::advance(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;

        assert_eq!(settled.borrow_and_update().as_deref(), Some("haifa"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_values_settle_again_after_idle() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_millis(300));

        debouncer.update(1u32);
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(301)).await;
        tokio::task::yield_now().await;
        assert_eq!(*settled.borrow_and_update(), Some(1));

        debouncer.update(2u32);
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(301)).await;
        tokio::task::yield_now().await;
        assert_eq!(*settled.borrow_and_update(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending_value() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_millis(300));

        debouncer.update("typed then closed".to_string());
        drop(debouncer);

        tokio::time::advance(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;

        assert!(settled.borrow_and_update().is_none());
    }
}
