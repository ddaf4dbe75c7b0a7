use crate::diff::diff;
use crate::effect::Effect;
use crate::msg::Msg;
use crate::state::{Phase, WatchState};

/// Pure update function: applies a message to the daemon state and returns
/// the effects the driver must perform.
///
/// Messages that do not fit the current phase (e.g. a late snapshot after
/// shutdown) are dropped without touching the state. The snapshot store is
/// replaced before any `Notify` effect is emitted, so a failed delivery
/// never resurfaces the same change on the next cycle.
pub fn update(mut state: WatchState, msg: Msg) -> (WatchState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started if state.phase() == Phase::Idle => {
            state.begin_cycle();
            state.set_phase(Phase::Fetching);
            vec![Effect::Fetch]
        }
        Msg::SnapshotFetched(snapshot) if state.phase() == Phase::Fetching => {
            let changes = diff(state.current(), &snapshot);
            state.replace_snapshot(snapshot);
            if changes.is_empty() {
                state.set_phase(Phase::Sleeping);
                vec![Effect::Sleep(state.interval())]
            } else {
                state.set_phase(Phase::Notifying);
                vec![Effect::Notify(changes)]
            }
        }
        Msg::FetchFailed { fatal: true } if state.phase() == Phase::Fetching => {
            state.set_phase(Phase::Terminal);
            vec![Effect::Stop { code: 1 }]
        }
        Msg::FetchFailed { fatal: false } if state.phase() == Phase::Fetching => {
            // Transient failure: keep the previous snapshot untouched so a
            // dropped cycle is never mistaken for "everything removed".
            state.set_phase(Phase::Sleeping);
            vec![Effect::Sleep(state.interval())]
        }
        Msg::NotifyFinished { delivered: _ } if state.phase() == Phase::Notifying => {
            // Delivery failures are the driver's to log; the loop continues
            // either way.
            state.set_phase(Phase::Sleeping);
            vec![Effect::Sleep(state.interval())]
        }
        Msg::SleepElapsed if state.phase() == Phase::Sleeping => {
            state.begin_cycle();
            state.set_phase(Phase::Fetching);
            vec![Effect::Fetch]
        }
        Msg::ShutdownRequested if state.phase() != Phase::Terminal => {
            state.set_phase(Phase::Terminal);
            vec![Effect::Stop { code: 0 }]
        }
        _ => Vec::new(),
    };

    (state, effects)
}
