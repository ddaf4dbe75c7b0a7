use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use gradewatch_core::{update, Effect, Msg, WatchState};
use gradewatch_engine::{
    compile_filters, notify, EngineEvent, EngineHandle, SessionSettings,
};
use watch_logging::{set_poll_cycle, watch_error, watch_info, watch_warn};

use crate::config::Config;
use crate::render::{course_heading, exercise_table, OutputStyle};

/// Builds the engine and completes the login handshake. All auth failures
/// are fatal here, in one-shot and daemon mode alike.
fn start_engine(config: &Config, filters: &[String]) -> Result<EngineHandle> {
    let filters = compile_filters(filters)?;
    let engine = EngineHandle::new(SessionSettings::default(), filters);
    engine.log_in(&config.portal_username, &config.portal_password);
    match engine.recv() {
        Some(EngineEvent::LoginCompleted(Ok(()))) => Ok(engine),
        Some(EngineEvent::LoginCompleted(Err(err))) => Err(err).context("portal login failed"),
        Some(EngineEvent::ShutdownRequested) => bail!("interrupted during login"),
        Some(other) => bail!("unexpected engine event during login: {other:?}"),
        None => bail!("engine thread terminated unexpectedly"),
    }
}

/// One-shot list mode: no snapshot store, no loop, errors are fatal.
pub fn run_list(config: &Config, filters: &[String], all: bool, style: OutputStyle) -> Result<()> {
    let engine = start_engine(config, filters)?;

    if !all {
        engine.list_courses();
        return match engine.recv() {
            Some(EngineEvent::CoursesListed(Ok(courses))) => {
                for course in courses {
                    println!("{}", course_heading(&course.code, style));
                }
                Ok(())
            }
            Some(EngineEvent::CoursesListed(Err(error))) => {
                Err(error).context("could not list courses")
            }
            Some(EngineEvent::ShutdownRequested) => bail!("interrupted"),
            Some(other) => bail!("unexpected engine event: {other:?}"),
            None => bail!("engine thread terminated unexpectedly"),
        };
    }

    engine.fetch_snapshot();
    match engine.recv() {
        Some(EngineEvent::SnapshotReady { snapshot, warnings }) => {
            for warning in &warnings {
                watch_warn!("{warning}");
            }
            for course in &snapshot.courses {
                println!("{}:", course_heading(&course.code, style));
                if !course.exercises.is_empty() {
                    println!("{}", exercise_table(&course.exercises, style));
                }
                println!();
            }
            Ok(())
        }
        Some(EngineEvent::SnapshotFailed { error }) => Err(error).context("could not list exercises"),
        Some(EngineEvent::ShutdownRequested) => bail!("interrupted"),
        Some(other) => bail!("unexpected engine event: {other:?}"),
        None => bail!("engine thread terminated unexpectedly"),
    }
}

/// Daemon mode: drives the core state machine until it stops, performing
/// its effects against the engine and the mailer. Returns the exit code the
/// machine decided on.
pub fn run_daemon(config: &Config, filters: &[String]) -> Result<i32> {
    let mail = config
        .mail
        .as_ref()
        .context("mail settings are required in daemon mode")?;
    let engine = start_engine(config, filters)?;
    watch_info!(
        "watching the portal every {}s, notifying {}",
        config.interval.as_secs(),
        mail.recipient
    );

    let mut state = WatchState::new(config.interval);
    let mut msg = Msg::Started;
    loop {
        let (next, effects) = update(state, msg);
        state = next;
        set_poll_cycle(state.cycle());

        let mut follow_up = None;
        for effect in effects {
            match effect {
                Effect::Fetch => {
                    watch_info!("cycle {}: fetching snapshot", state.cycle());
                    engine.fetch_snapshot();
                    follow_up = Some(await_snapshot(&engine)?);
                }
                Effect::Notify(changes) => {
                    watch_info!("cycle {}: {} change(s) detected", state.cycle(), changes.len());
                    let observed_at = Utc::now().to_rfc3339();
                    let delivered = match notify(&changes, &observed_at, mail) {
                        Ok(()) => {
                            watch_info!("notification sent to {}", mail.recipient);
                            true
                        }
                        Err(err) => {
                            watch_error!("notification failed: {err}");
                            false
                        }
                    };
                    follow_up = Some(Msg::NotifyFinished { delivered });
                }
                Effect::Sleep(interval) => {
                    follow_up = Some(sleep_or_event(&engine, interval)?);
                }
                Effect::Stop { code } => {
                    watch_info!("stopping with exit code {code}");
                    return Ok(code);
                }
            }
        }

        msg = follow_up.context("state machine produced no actionable effect")?;
    }
}

fn await_snapshot(engine: &EngineHandle) -> Result<Msg> {
    loop {
        match engine.recv() {
            Some(EngineEvent::SnapshotReady { snapshot, warnings }) => {
                for warning in &warnings {
                    watch_warn!("{warning}");
                }
                return Ok(Msg::SnapshotFetched(snapshot));
            }
            Some(EngineEvent::SnapshotFailed { error }) => {
                let fatal = error.is_fatal();
                if fatal {
                    watch_error!("snapshot failed: {error}");
                } else {
                    watch_warn!("snapshot failed, skipping this cycle: {error}");
                }
                return Ok(Msg::FetchFailed { fatal });
            }
            Some(EngineEvent::ShutdownRequested) => return Ok(Msg::ShutdownRequested),
            Some(other) => watch_warn!("ignoring engine event while fetching: {other:?}"),
            None => bail!("engine thread terminated unexpectedly"),
        }
    }
}

/// Cancellable sleep: waits out `interval` on the event channel so a
/// shutdown (or any late engine event) can interrupt it.
fn sleep_or_event(engine: &EngineHandle, interval: Duration) -> Result<Msg> {
    let deadline = Instant::now() + interval;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(Msg::SleepElapsed);
        }
        match engine.recv_timeout(remaining) {
            Ok(EngineEvent::ShutdownRequested) => return Ok(Msg::ShutdownRequested),
            Ok(other) => watch_warn!("ignoring engine event during sleep: {other:?}"),
            Err(RecvTimeoutError::Timeout) => return Ok(Msg::SleepElapsed),
            Err(RecvTimeoutError::Disconnected) => {
                bail!("engine thread terminated unexpectedly")
            }
        }
    }
}
