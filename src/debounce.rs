//! Restartable one-shot timer.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Pending callback scheduled by [`schedule`].
#[derive(Debug)]
pub struct TimerHandle {
    delay: Duration,
    timer: JoinHandle<()>,
}

/// Runs `callback` once `delay` has elapsed, unless the handle is reset first.
///
/// The callback is spawned as its own task when the timer fires, so resetting the
/// handle afterwards never interrupts a callback that already started.
pub fn schedule<F, Fut>(delay: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let timer = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        tokio::spawn(callback());
    });
    TimerHandle { delay, timer }
}

impl TimerHandle {
    /// Cancels the pending callback and schedules `callback` with the same delay.
    pub fn reset<F, Fut>(&mut self, callback: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.timer.abort();
        *self = schedule(self.delay, callback);
    }

    /// Whether the delay has not elapsed yet.
    pub fn is_pending(&self) -> bool {
        !self.timer.is_finished()
    }
}
