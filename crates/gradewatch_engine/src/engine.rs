use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use gradewatch_core::{Course, Snapshot};
use regex::Regex;

use crate::scrape::{self, ScrapeError, ScrapeWarning};
use crate::session::{AuthError, NetworkError, PortalSession, SessionSettings};

enum EngineCommand {
    LogIn { username: String, password: String },
    ListCourses,
    FetchSnapshot,
}

#[derive(Debug)]
pub enum EngineEvent {
    LoginCompleted(Result<(), AuthError>),
    CoursesListed(Result<Vec<Course>, ScrapeError>),
    SnapshotReady {
        snapshot: Snapshot,
        warnings: Vec<ScrapeWarning>,
    },
    SnapshotFailed {
        error: ScrapeError,
    },
    /// Ctrl-C was observed; the driver should wind down.
    ShutdownRequested,
}

/// Handle to the I/O thread. The thread owns the tokio runtime and the
/// portal session; callers stay fully synchronous and talk over channels.
///
/// Commands are processed strictly in order, one at a time, so no login or
/// token refresh can ever overlap a snapshot fetch.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: SessionSettings, filters: Vec<Regex>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

            let shutdown_tx = event_tx.clone();
            runtime.spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = shutdown_tx.send(EngineEvent::ShutdownRequested);
                }
            });

            let mut session: Option<PortalSession> = None;
            while let Ok(command) = cmd_rx.recv() {
                let event =
                    runtime.block_on(handle_command(&mut session, &settings, &filters, command));
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn log_in(&self, username: impl Into<String>, password: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::LogIn {
            username: username.into(),
            password: password.into(),
        });
    }

    pub fn list_courses(&self) {
        let _ = self.cmd_tx.send(EngineCommand::ListCourses);
    }

    pub fn fetch_snapshot(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchSnapshot);
    }

    /// Blocks for the next event. `None` means the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    /// Waits up to `timeout` for an event; the daemon's cancellable sleep.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

async fn handle_command(
    session: &mut Option<PortalSession>,
    settings: &SessionSettings,
    filters: &[Regex],
    command: EngineCommand,
) -> EngineEvent {
    match command {
        EngineCommand::LogIn { username, password } => {
            EngineEvent::LoginCompleted(log_in(session, settings, &username, &password).await)
        }
        EngineCommand::ListCourses => {
            EngineEvent::CoursesListed(list_courses(session, filters).await)
        }
        EngineCommand::FetchSnapshot => match fetch_snapshot(session, filters).await {
            Ok((snapshot, warnings)) => EngineEvent::SnapshotReady { snapshot, warnings },
            Err(error) => EngineEvent::SnapshotFailed { error },
        },
    }
}

async fn log_in(
    session: &mut Option<PortalSession>,
    settings: &SessionSettings,
    username: &str,
    password: &str,
) -> Result<(), AuthError> {
    let mut fresh = PortalSession::new(settings.clone())?;
    fresh.initialize().await?;
    fresh.login(username, password).await?;
    *session = Some(fresh);
    Ok(())
}

async fn list_courses(
    session: &mut Option<PortalSession>,
    filters: &[Regex],
) -> Result<Vec<Course>, ScrapeError> {
    let session = session.as_mut().ok_or(NetworkError::NotLoggedIn)?;
    scrape::list_courses(session, filters).await
}

async fn fetch_snapshot(
    session: &mut Option<PortalSession>,
    filters: &[Regex],
) -> Result<(Snapshot, Vec<ScrapeWarning>), ScrapeError> {
    let session = session.as_mut().ok_or(NetworkError::NotLoggedIn)?;
    let courses = scrape::list_courses(session, filters).await?;
    scrape::snapshot(session, &courses).await
}
