use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Error, Debug)]
pub enum TimerError {
    #[error("No scheduler is available to run the timer")]
    SchedulerUnavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A repeating side action that runs while the timer is pending.
pub struct Tick {
    interval: Duration,
    on_tick: Box<dyn FnMut() + Send>,
}

impl Tick {
    pub fn new(interval: Duration, on_tick: impl FnMut() + Send + 'static) -> Self {
        Self {
            interval,
            on_tick: Box::new(on_tick),
        }
    }
}

/// Whether the expiry may still run. Firing and cancelling race on this one
/// value, and only the side that moves it away from `PENDING` wins.
#[derive(Default)]
struct TimerState(AtomicU8);

impl TimerState {
    fn try_fire(&self) -> bool {
        self.0
            .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn try_cancel(&self) -> bool {
        self.0
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn get(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }
}

/// Owner of one scheduled expiry (plus its optional tick).
///
/// Dropping the handle cancels it.
pub struct TimerHandle {
    id: TimerId,
    state: Arc<TimerState>,
    task: AbortHandle,
}

impl TimerHandle {
    #[must_use]
    pub const fn id(&self) -> TimerId {
        self.id
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.get() == PENDING
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.state.get() == FIRED
    }

    /// Stops the tick and the expiry. Returns `true` if this call is the one
    /// that kept the expiry from running; cancelling again, or after the
    /// expiry already started, does nothing.
    pub fn cancel(&self) -> bool {
        let cancelled = self.state.try_cancel();
        self.task.abort();
        cancelled
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

/// Cancellable delayed execution on top of a tokio runtime.
#[derive(Clone, Default)]
pub struct PlaybackTimer {
    runtime: Option<Handle>,
}

impl PlaybackTimer {
    /// Schedules on `runtime` no matter where `start` is called from.
    #[must_use]
    pub const fn new(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }

    /// Schedules on whatever runtime the caller of `start` runs in.
    #[must_use]
    pub const fn current() -> Self {
        Self { runtime: None }
    }

    /// Runs `on_expire` once after `delay`, and `tick` every interval until
    /// then. `on_expire` gets the id of the handle it belongs to.
    pub fn start<E>(
        &self,
        delay: Duration,
        on_expire: E,
        tick: Option<Tick>,
    ) -> Result<TimerHandle, TimerError>
    where
        E: FnOnce(TimerId) + Send + 'static,
    {
        let runtime = match &self.runtime {
            Some(runtime) => runtime.clone(),
            None => Handle::try_current().map_err(|_| TimerError::SchedulerUnavailable)?,
        };
        let id = TimerId(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed));
        let state = Arc::new(TimerState::default());

        let task_state = state.clone();
        let task = runtime.spawn(async move {
            let expiry = tokio::time::sleep(delay);
            tokio::pin!(expiry);

            let (mut interval, mut on_tick) = match tick {
                Some(Tick { interval, on_tick }) => {
                    let mut ticks = tokio::time::interval_at(Instant::now() + interval, interval);
                    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    (Some(ticks), Some(on_tick))
                }
                None => (None, None),
            };

            loop {
                tokio::select! {
                    biased;
                    () = &mut expiry => {
                        if task_state.try_fire() {
                            on_expire(id);
                        }
                        return;
                    }
                    () = next_tick(&mut interval) => {
                        if task_state.get() != PENDING {
                            return;
                        }
                        if let Some(on_tick) = on_tick.as_mut() {
                            on_tick();
                        }
                    }
                }
            }
        });

        Ok(TimerHandle {
            id,
            state,
            task: task.abort_handle(),
        })
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
