//! Repeating timer with a single cancel handle

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Handle to a running repeating timer.
///
/// Dropping the handle does not stop the timer; call [`TimerHandle::cancel`].
#[derive(Debug)]
pub struct TimerHandle {
    task: AbortHandle,
    period: Duration,
}

impl TimerHandle {
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop the timer. A tick that has not started yet never runs.
    pub fn cancel(self) {
        self.task.abort();
    }

    /// True once the timer task has stopped, whether cancelled or not
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Call `tick` every `period`, starting one period from now.
///
/// Ticks run one at a time: the next tick is not awaited until the
/// previous call returns. Returns `None` outside a Tokio runtime.
pub fn start_repeating<F>(period: Duration, mut tick: F) -> Option<TimerHandle>
where
    F: FnMut() + Send + 'static,
{
    let runtime = match Handle::try_current() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(error = %e, "No async runtime, timer not started");
            return None;
        }
    };

    let Some(first) = Instant::now().checked_add(period) else {
        tracing::warn!(period_secs = period.as_secs(), "Timer period out of range, timer not started");
        return None;
    };

    let task = runtime.spawn(async move {
        let mut interval = interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            tick();
        }
    });

    Some(TimerHandle {
        task: task.abort_handle(),
        period,
    })
}
