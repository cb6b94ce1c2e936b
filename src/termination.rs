use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Polled by the engines between steps; once it returns `true` the run stops with [`Aborted`].
pub trait Termination {
    fn should_stop(&mut self) -> bool;
}

/// The run was stopped by its [`Termination`] before it reached an answer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Aborted;

impl Display for Aborted {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("the run was aborted before it finished")
    }
}

impl std::error::Error for Aborted {}

/// Never stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct Indefinite;

impl Termination for Indefinite {
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Stops once `budget` has elapsed since the budget was created.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    started_at: Instant,
    budget: Duration,
}

impl TimeBudget {
    pub fn starting_now(budget: Duration) -> Self {
        Self {
            started_at: Instant::now(),
            budget,
        }
    }
}

impl Termination for TimeBudget {
    fn should_stop(&mut self) -> bool {
        self.started_at.elapsed() >= self.budget
    }
}

/// Stops once any clone of this flag has been cancelled, possibly from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Termination for CancelFlag {
    fn should_stop(&mut self) -> bool {
        self.is_cancelled()
    }
}
