//! Typing timer — a cancellable one-shot delayed callback.
//!
//! DESIGN
//! ======
//! Each arm spawns a Tokio task on the runtime the owner designates and
//! stamps it with a fresh [`Generation`]. Arming again, or cancelling,
//! aborts the previous task and forgets its generation, so at most one
//! task per timer is ever live.
//!
//! RACE WINDOW
//! ===========
//! `JoinHandle::abort` cannot stop a task that already woke from its sleep
//! and is running its callback on another worker thread. Owners close that
//! window by keeping the timer behind the same lock their callback takes
//! and calling [`TypingTimer::claim`] before touching anything: a cancelled
//! or replaced generation fails the claim, so its callback body never runs
//! after `cancel()` returns.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Identifies one armed instance of a [`TypingTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

struct Armed {
    generation: Generation,
    task: JoinHandle<()>,
}

pub struct TypingTimer {
    label: &'static str,
    runtime: Handle,
    armed: Option<Armed>,
    next_generation: u64,
}

impl TypingTimer {
    /// Create an idle timer whose callbacks run on `runtime`.
    #[must_use]
    pub fn new(label: &'static str, runtime: Handle) -> Self {
        Self { label, runtime, armed: None, next_generation: 0 }
    }

    /// Replace any armed generation with a new task running `job`.
    ///
    /// The job receives its own generation so it can [`claim`](Self::claim)
    /// before mutating shared state.
    pub fn arm<F, Fut>(&mut self, job: F) -> Generation
    where
        F: FnOnce(Generation) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let generation = Generation(self.next_generation);
        self.next_generation = self.next_generation.wrapping_add(1);
        let task = self.runtime.spawn(job(generation));
        self.armed = Some(Armed { generation, task });
        debug!(timer = self.label, generation = generation.0, "timer armed");
        generation
    }

    /// Arm a one-shot callback that fires after `delay` unless cancelled first.
    pub fn schedule<F>(&mut self, delay: Duration, on_elapsed: F) -> Generation
    where
        F: FnOnce(Generation) + Send + 'static,
    {
        self.arm(move |generation| async move {
            tokio::time::sleep(delay).await;
            on_elapsed(generation);
        })
    }

    /// Cancel the armed generation, if any. Returns whether one was live.
    ///
    /// Cancelling an idle, fired or already-cancelled timer is a no-op.
    pub fn cancel(&mut self) -> bool {
        let Some(armed) = self.armed.take() else {
            return false;
        };
        let was_live = !armed.task.is_finished();
        armed.task.abort();
        if was_live {
            debug!(timer = self.label, generation = armed.generation.0, "timer cancelled");
        }
        was_live
    }

    /// Whether `generation` is still the armed one.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.armed.as_ref().is_some_and(|a| a.generation == generation)
    }

    /// Claim the elapse of `generation`, disarming the timer.
    ///
    /// Returns `false` when the generation was cancelled or replaced; the
    /// caller must then return without side effects.
    pub fn claim(&mut self, generation: Generation) -> bool {
        if !self.is_current(generation) {
            debug!(timer = self.label, generation = generation.0, "stale timer elapse ignored");
            return false;
        }
        self.armed = None;
        debug!(timer = self.label, generation = generation.0, "timer elapsed");
        true
    }

    /// Whether a generation is armed and its task has not finished.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.as_ref().is_some_and(|a| !a.task.is_finished())
    }
}

impl Drop for TypingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "timer_test.rs"]
mod tests;
