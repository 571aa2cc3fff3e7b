//! Cancellable fixed-period background task.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Runs a callback every `period` on the tokio runtime, starting
/// immediately.
///
/// The task ends on [`PeriodicTask::stop`], or is aborted when the handle
/// is dropped.
#[derive(Debug)]
pub struct PeriodicTask {
    handle: Option<JoinHandle<()>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl PeriodicTask {
    /// Spawns the task. Must be called from within a tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn start<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (cancel, mut cancelled) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut cancelled => break,
                    _ = interval.tick() => tick().await,
                }
            }
        });

        Self {
            handle: Some(handle),
            cancel: Some(cancel),
        }
    }

    /// Whether the task is still scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the task to finish and waits for it. A tick in progress is
    /// allowed to complete.
    pub async fn stop(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::error!("Periodic task failed: {e}");
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
