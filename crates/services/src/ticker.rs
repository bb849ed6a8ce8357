//! Periodic task with an explicit cancel handle.
//!
//! Used as the Clock Source of an assessment session, and for any other
//! interval-driven refresh.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

pub struct Ticker;

impl Ticker {
    /// Invoke `on_tick` once per `period`, first one period after spawning.
    ///
    /// Runs until `on_tick` returns `TickControl::Stop` or the returned handle
    /// is cancelled or dropped. Ticks never overlap: the next one is not
    /// awaited until `on_tick` has finished.
    pub fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> TickerHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickControl> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    _ = interval.tick() => {}
                }
                if cancelled.is_cancelled() {
                    break;
                }
                if on_tick().await == TickControl::Stop {
                    break;
                }
            }
        });

        TickerHandle {
            token,
            task: Some(task),
        }
    }
}

/// Owner of a running `Ticker`. Dropping it cancels the ticker.
pub struct TickerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Stop scheduling ticks. A tick already executing runs to completion;
    /// no new one starts afterwards.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the ticker task to exit on its own.
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
