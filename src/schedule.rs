//! Cancellable recurring callbacks
//!
//! A [`PollHandle`] owns one spawned tokio task that runs a callback on a fixed
//! cadence. Components keep their handle in a [`PollSlot`], which only lets a
//! new callback start after the previous one has been cancelled.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Handle to a recurring scheduled callback
///
/// Cancelling is idempotent. Dropping the handle cancels the callback.
#[derive(Debug)]
pub struct PollHandle {
    name: &'static str,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop the callback. Returns `true` only for the call that actually cancelled it.
    pub fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                debug!("{}: callback cancelled", self.name);
                true
            }
            None => false,
        }
    }

    /// Release the handle without aborting the task.
    ///
    /// Used by a callback on its final tick, which ends on its own.
    pub fn detach(mut self) {
        self.task.take();
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawn `tick` every `period`, first firing one `period` from now.
///
/// The callback ends the schedule by returning `ControlFlow::Break`.
pub fn spawn_recurring<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if tick().await.is_break() {
                debug!("{}: callback finished", name);
                break;
            }
        }
    });

    PollHandle {
        name,
        task: Some(task),
    }
}

/// Run `action` once after `delay`.
pub fn spawn_delayed<Fut>(name: &'static str, delay: Duration, action: Fut) -> PollHandle
where
    Fut: Future<Output = ()> + Send + 'static,
{
    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        action.await;
    });

    PollHandle {
        name,
        task: Some(task),
    }
}

/// Holder for at most one live [`PollHandle`] of a given kind
#[derive(Debug, Default)]
pub struct PollSlot {
    handle: Option<PollHandle>,
}

impl PollSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is installed, then install the handle built by `create`.
    pub fn restart(&mut self, create: impl FnOnce() -> PollHandle) {
        self.cancel();
        self.handle = Some(create());
    }

    /// Cancel the installed callback, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(mut handle) => handle.cancel(),
            None => false,
        }
    }

    /// Remove the handle without aborting; for a callback finishing itself.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.detach();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(PollHandle::is_active)
    }
}
