//! Rest timer - cancellable delayed callback on the tokio runtime

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// At most one pending countdown; starting a new one replaces the old
#[derive(Default)]
pub struct RestTimer {
    task: Option<JoinHandle<()>>,
    deadline: Option<Instant>,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_done` after `duration`. Must be called inside a tokio runtime.
    pub fn start<F>(&mut self, duration: Duration, on_done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let deadline = Instant::now() + duration;
        self.deadline = Some(deadline);
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_done();
        }));
        debug!("Rest timer started: {}s", duration.as_secs());
    }

    /// Abort the pending countdown; true if one was running
    pub fn cancel(&mut self) -> bool {
        self.deadline = None;
        match self.task.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }

    /// Time left, or `None` when idle or expired
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
            .filter(|left| !left.is_zero())
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for RestTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let handle = hits.clone();
        (hits, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_fires_after_delay() {
        let mut timer = RestTimer::new();
        let (hits, callback) = counter();
        timer.start(Duration::from_millis(20), callback);
        assert!(timer.is_running());
        assert!(timer.remaining().is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!timer.is_running());
        assert!(timer.remaining().is_none());
    }

    #[tokio::test]
    async fn test_cancel() {
        let mut timer = RestTimer::new();
        let (hits, callback) = counter();
        timer.start(Duration::from_millis(50), callback);
        assert!(timer.cancel());
        assert!(!timer.cancel());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restart_replaces_pending() {
        let mut timer = RestTimer::new();
        let (first, first_cb) = counter();
        let (second, second_cb) = counter();
        timer.start(Duration::from_millis(50), first_cb);
        timer.start(Duration::from_millis(50), second_cb);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_idle_timer() {
        let mut timer = RestTimer::new();
        assert!(!timer.is_running());
        assert!(timer.remaining().is_none());
        assert!(!timer.cancel());
    }
}
