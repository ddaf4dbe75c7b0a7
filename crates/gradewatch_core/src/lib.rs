//! Gradewatch core: pure data model, status parsing, change detection and
//! the poll-loop state machine. No I/O lives here.
mod diff;
mod effect;
mod model;
mod msg;
mod state;
mod status;
mod update;

pub use diff::{diff, Change, ChangeKind};
pub use effect::Effect;
pub use model::{course_code, Course, CourseExercises, Exercise, Snapshot};
pub use msg::Msg;
pub use state::{Phase, WatchState};
pub use status::{
    parse_status, ExerciseStatus, Graded, StatusField, StatusParseError, STATUS_MARKER,
};
pub use update::update;
