//! Cancellable countdown task
//!
//! The auto-confirm timer is the only concurrently live resource of the
//! workflow. It is owned through a handle that aborts the task when
//! cancelled or dropped, so no tick can fire after teardown.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// What the tick callback wants next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    /// Wait for the next tick
    Continue,
    /// Stop ticking
    Stop,
}

/// Handle to a spawned countdown
#[derive(Debug)]
pub struct CountdownTask {
    handle: Option<JoinHandle<()>>,
}

impl CountdownTask {
    /// Spawn `fut` on the current runtime
    ///
    /// # Panics
    /// Outside of a tokio runtime.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(fut)),
        }
    }

    /// Abort the task
    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Release the handle and let the task run to completion
    pub fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for CountdownTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Call `on_tick` once per `period`, first call one period from now
///
/// Returns when `on_tick` asks to stop.
pub async fn tick_every<F>(period: Duration, mut on_tick: F)
where
    F: FnMut() -> TickFlow,
{
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if on_tick() == TickFlow::Stop {
            break;
        }
    }
}
