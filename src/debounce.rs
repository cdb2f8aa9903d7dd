use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Value delivered once the input has been quiet for the full interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled<T> {
    pub generation: u64,
    pub value: T,
}

/// Cancellable delayed action: every `update` aborts the pending timer and
/// schedules a new one, so a burst of updates settles once with its last value.
///
/// A timer can fire and enqueue its settlement just before a newer update
/// aborts it; owners check `accept` on receipt to drop such stale values.
pub struct Debouncer<T> {
    interval: Duration,
    sink: mpsc::UnboundedSender<Settled<T>>,
    pending: Option<AbortHandle>,
    generation: u64,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(interval: Duration, sink: mpsc::UnboundedSender<Settled<T>>) -> Self {
        Self {
            interval,
            sink,
            pending: None,
            generation: 0,
        }
    }

    pub fn update(&mut self, value: T) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let interval = self.interval;
        let sink = self.sink.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            let _ = sink.send(Settled { generation, value });
        });
        self.pending = Some(handle.abort_handle());
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume a received settlement. Returns false for one that was
    /// superseded or cancelled after its timer fired.
    pub fn accept(&mut self, settled: &Settled<T>) -> bool {
        if self.pending.is_some() && settled.generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    const INTERVAL: Duration = Duration::from_millis(800);

    fn debouncer() -> (Debouncer<String>, mpsc::UnboundedReceiver<Settled<String>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Debouncer::new(INTERVAL, tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_settles_once_with_last_value() {
        let (mut debouncer, mut rx) = debouncer();

        let mut last_update = Instant::now();
        for word in ["ส", "สวั", "สวัส", "สวัสดี"] {
            debouncer.update(word.to_string());
            last_update = Instant::now();
            sleep(INTERVAL / 2).await;
        }

        let settled = rx.recv().await.unwrap();
        assert!(Instant::now() >= last_update + INTERVAL);
        assert_eq!(settled.value, "สวัสดี");
        assert!(debouncer.accept(&settled));

        sleep(INTERVAL * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_settle_separately() {
        let (mut debouncer, mut rx) = debouncer();

        debouncer.update("a".to_string());
        let first = rx.recv().await.unwrap();
        assert!(debouncer.accept(&first));

        debouncer.update("b".to_string());
        let second = rx.recv().await.unwrap();
        assert!(debouncer.accept(&second));
        assert_eq!(second.value, "b");
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_settlement() {
        let (mut debouncer, mut rx) = debouncer();

        debouncer.update("ไม่".to_string());
        sleep(INTERVAL / 4).await;
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        sleep(INTERVAL * 2).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settlement_queued_before_newer_update_is_rejected() {
        let (mut debouncer, mut rx) = debouncer();

        debouncer.update("old".to_string());
        sleep(INTERVAL + Duration::from_millis(1)).await;
        debouncer.update("new".to_string());

        let stale = rx.recv().await.unwrap();
        assert_eq!(stale.value, "old");
        assert!(!debouncer.accept(&stale));

        let fresh = rx.recv().await.unwrap();
        assert_eq!(fresh.value, "new");
        assert!(debouncer.accept(&fresh));
    }
}
