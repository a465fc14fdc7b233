//! Recurring bursts on a fixed interval.
//!
//! The scheduler polls on a short quantum and runs the job inline, so a job
//! that is still running can never be started a second time. Both the poll
//! sleep and any sleep inside the job go through a [`Timer`] and observe the
//! same [`CancellationToken`].

use crate::error::ConfigError;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How often the scheduler checks whether the job is due.
pub const DEFAULT_POLL_QUANTUM: Duration = Duration::from_secs(1);

/// Shared stop flag that wakes up sleepers when set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, wakeup) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wakeup.notify_all();
    }

    /// Callback that cancels this token, for handing to a signal handler.
    pub fn canceller(&self) -> impl Fn() + Send + 'static {
        let token = self.clone();
        move || token.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`. Returns `true` if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, wakeup) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = wakeup
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Monotonic time and cancellable sleep.
pub trait Timer {
    /// Time since an arbitrary fixed origin
    fn elapsed(&self) -> Duration;

    /// Sleep for `duration`. Returns `false` if cancelled before or during the sleep.
    fn sleep(&self, duration: Duration, cancel: &CancellationToken) -> bool;
}

impl<T: Timer + ?Sized> Timer for &T {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }

    fn sleep(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        (**self).sleep(duration, cancel)
    }
}

/// Real time, blocking the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimer {
    origin: Instant,
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Timer for SystemTimer {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        if duration.is_zero() {
            return !cancel.is_cancelled();
        }
        !cancel.wait_timeout(duration)
    }
}

/// Fire bookkeeping for a job repeating every `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledJob {
    interval: Duration,
    last_fire: Option<Duration>,
}

impl ScheduledJob {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
        }
    }

    /// `None` until the job has fired once, then last fire + interval.
    pub fn next_fire(&self) -> Option<Duration> {
        self.last_fire.map(|last| last + self.interval)
    }

    pub fn is_due(&self, now: Duration) -> bool {
        self.next_fire().map_or(true, |next| now >= next)
    }

    pub fn mark_fired(&mut self, now: Duration) {
        self.last_fire = Some(now);
    }
}

/// Runs a job now and then every `interval` until cancelled.
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    poll_quantum: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        if interval < Duration::from_secs(1) {
            return Err(ConfigError::Interval);
        }
        Ok(Self {
            interval,
            poll_quantum: DEFAULT_POLL_QUANTUM,
        })
    }

    pub fn with_poll_quantum(mut self, quantum: Duration) -> Self {
        self.poll_quantum = quantum;
        self
    }

    /// Run `job` immediately, then whenever the interval has elapsed since its
    /// last start. Returns the number of runs once `cancel` is triggered.
    pub fn run<T, F>(&self, timer: &T, cancel: &CancellationToken, mut job: F) -> u64
    where
        T: Timer + ?Sized,
        F: FnMut(),
    {
        let mut scheduled = ScheduledJob::new(self.interval);
        let mut runs = 0u64;

        tracing::info!(
            "Scheduling burst every {}s (poll every {}ms)",
            self.interval.as_secs(),
            self.poll_quantum.as_millis()
        );

        while !cancel.is_cancelled() {
            let now = timer.elapsed();
            if scheduled.is_due(now) {
                scheduled.mark_fired(now);
                runs += 1;
                tracing::debug!("Run {} starting at {:?}", runs, now);
                job();
            }

            if !timer.sleep(self.poll_quantum, cancel) {
                break;
            }
        }

        tracing::info!("Scheduler stopped after {} runs", runs);
        runs
    }
}

#[cfg(test)]
pub mod testing {
    use super::{CancellationToken, Timer};
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    /// Virtual clock: sleeping advances time instantly.
    ///
    /// Once time reaches the optional deadline the token is cancelled, which
    /// stops any loop driven by this timer.
    #[derive(Debug, Default)]
    pub struct ManualTimer {
        now: Cell<Duration>,
        deadline: Option<Duration>,
        sleeps: RefCell<Vec<Duration>>,
    }

    impl ManualTimer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn stop_at(deadline: Duration) -> Self {
            Self {
                deadline: Some(deadline),
                ..Self::default()
            }
        }

        pub fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }

        /// Durations of all completed or interrupted sleeps, in order.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.borrow().clone()
        }
    }

    impl Timer for ManualTimer {
        fn elapsed(&self) -> Duration {
            self.now.get()
        }

        fn sleep(&self, duration: Duration, cancel: &CancellationToken) -> bool {
            if cancel.is_cancelled() {
                return false;
            }
            self.sleeps.borrow_mut().push(duration);
            let target = self.now.get() + duration;
            match self.deadline {
                Some(deadline) if target >= deadline => {
                    self.now.set(deadline);
                    cancel.cancel();
                    false
                }
                _ => {
                    self.now.set(target);
                    true
                }
            }
        }
    }
}
