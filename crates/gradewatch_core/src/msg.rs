use crate::model::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Daemon mode was entered; begin the first cycle.
    Started,
    /// The engine assembled a complete snapshot.
    SnapshotFetched(Snapshot),
    /// The engine could not assemble a snapshot this cycle. `fatal` marks
    /// auth/config failures that must terminate the run; everything else is
    /// transient and only skips the comparison.
    FetchFailed { fatal: bool },
    /// The notifier finished, successfully or not.
    NotifyFinished { delivered: bool },
    /// The configured interval elapsed without interruption.
    SleepElapsed,
    /// External shutdown signal.
    ShutdownRequested,
}
