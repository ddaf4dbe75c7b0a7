//! Gradewatch engine: portal I/O, scraping and notification delivery.
mod engine;
mod extract;
mod notify;
mod scrape;
mod session;

pub use engine::{EngineEvent, EngineHandle};
pub use extract::{course_links, exercise_entries, find_csrf_token, ExerciseEntry, CSRF_MARKER};
pub use notify::{
    notify, render_body, render_subject, MailSettings, NotifyError, SUBJECT_COURSE_PLACEHOLDER,
};
pub use scrape::{
    compile_filters, list_courses, list_exercises, snapshot, ScrapeError, ScrapeWarning,
};
pub use session::{
    AuthError, NetworkError, PortalSession, SessionSettings, DEFAULT_PORTAL_URL,
};
