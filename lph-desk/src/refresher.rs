//! Cancellable periodic background task
//!
//! Each session owns one [`Refresher`]. The first tick fires one period
//! after spawning; the loop ends when cancelled, when the handle is dropped,
//! or when a tick returns [`ControlFlow::Break`].

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

pub struct Refresher {
    name: String,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Refresher {
    /// Spawn `tick` every `period` on the current runtime
    pub fn spawn<F, Fut>(name: impl Into<String>, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let name = name.into();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            debug!(refresher = %task_name, period_ms = period.as_millis() as u64, "Refresher started");

            loop {
                tokio::select! {
                    // Fires on cancel and when the sender is dropped
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {
                        if tick().await.is_break() {
                            break;
                        }
                    }
                }
            }

            debug!(refresher = %task_name, "Refresher stopped");
        });

        Self {
            name,
            shutdown_tx,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the loop after any tick in flight. Idempotent.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Refresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refresher")
            .field("name", &self.name)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(period: Duration, stop_after: Option<usize>) -> (Refresher, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let refresher = Refresher::spawn("test", period, move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                match stop_after {
                    Some(limit) if n >= limit => ControlFlow::Break(()),
                    _ => ControlFlow::Continue(()),
                }
            }
        });
        (refresher, ticks)
    }

    #[tokio::test]
    async fn test_ticks_until_cancelled() {
        let (refresher, ticks) = counting(Duration::from_millis(10), None);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(ticks.load(Ordering::SeqCst) >= 2);

        refresher.cancel();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(refresher.is_cancelled());
        assert!(refresher.is_finished());

        let after_cancel = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }

    #[tokio::test]
    async fn test_first_tick_waits_one_period() {
        let (_refresher, ticks) = counting(Duration::from_secs(60), None);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_break_stops_loop() {
        let (refresher, ticks) = counting(Duration::from_millis(5), Some(2));
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(refresher.is_finished());
        assert!(!refresher.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (refresher, ticks) = counting(Duration::from_millis(10), None);
        drop(refresher);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
