use std::time::Duration;

use crate::diff::Change;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the engine for a fresh snapshot.
    Fetch,
    /// Deliver a notification for these changes.
    Notify(Vec<Change>),
    /// Wait out the poll interval. The wait must be cancellable by a
    /// shutdown signal.
    Sleep(Duration),
    /// Terminate the run with this exit code.
    Stop { code: i32 },
}
