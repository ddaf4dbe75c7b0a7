use std::time::Duration;

use crate::model::Snapshot;

/// Observable phase of the poll loop.
///
/// Comparison runs atomically inside the transition out of `Fetching`, so a
/// half-compared snapshot is never an observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Fetching,
    Notifying,
    Sleeping,
    Terminal,
}

/// The whole daemon state: current phase, the snapshot store, and the
/// configured poll interval. Owned by the driver, mutated only through
/// [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchState {
    phase: Phase,
    current: Option<Snapshot>,
    interval: Duration,
    cycle: u64,
}

impl WatchState {
    pub fn new(interval: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            current: None,
            interval,
            cycle: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The most recent complete observation, if any cycle has succeeded yet.
    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 1-based number of the cycle currently running (0 before start).
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn replace_snapshot(&mut self, snapshot: Snapshot) {
        self.current = Some(snapshot);
    }

    pub(crate) fn begin_cycle(&mut self) {
        self.cycle += 1;
    }
}
