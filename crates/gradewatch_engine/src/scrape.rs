use std::fmt;

use futures_util::stream::{self, StreamExt};
use gradewatch_core::{parse_status, Course, CourseExercises, Exercise, Snapshot};
use regex::Regex;
use thiserror::Error;
use watch_logging::watch_debug;

use crate::extract;
use crate::session::{AuthError, NetworkError, PortalSession};

/// Per-course page fetches within one snapshot run concurrently up to this
/// bound, sharing the session read-only.
const MAX_CONCURRENT_COURSE_FETCHES: usize = 4;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("invalid course filter `{pattern}`: {source}")]
    BadFilter {
        pattern: String,
        source: regex::Error,
    },
}

impl ScrapeError {
    /// Fatal errors terminate the run; the rest skip one poll cycle.
    pub fn is_fatal(&self) -> bool {
        match self {
            ScrapeError::Auth(_) | ScrapeError::BadFilter { .. } => true,
            ScrapeError::Network(NetworkError::NotLoggedIn) => true,
            ScrapeError::Network(_) => false,
        }
    }
}

/// A single exercise that had to be dropped from a listing. Warnings never
/// abort a course; a course that cannot be fetched at all is a
/// [`ScrapeError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeWarning {
    pub course: String,
    pub exercise_id: String,
    pub reason: String,
}

impl fmt::Display for ScrapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dropped {}/{}: {}",
            self.course, self.exercise_id, self.reason
        )
    }
}

/// Compiles course name filters. An unparseable pattern is a configuration
/// error and fatal.
pub fn compile_filters(patterns: &[String]) -> Result<Vec<Regex>, ScrapeError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ScrapeError::BadFilter {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Discovers courses from the frontpage. An empty filter set means every
/// course; otherwise a course is kept when any filter matches its URL.
pub async fn list_courses(
    session: &mut PortalSession,
    filters: &[Regex],
) -> Result<Vec<Course>, ScrapeError> {
    let html = session.frontpage().await?;
    let mut courses: Vec<Course> = Vec::new();
    for href in extract::course_links(&html) {
        if !filters.is_empty() && !filters.iter().any(|filter| filter.is_match(&href)) {
            continue;
        }
        match Course::from_url(href.clone()) {
            Some(course) => {
                // Frontpages link each course more than once; keep the first.
                if courses.iter().all(|seen| seen.code != course.code) {
                    courses.push(course);
                }
            }
            None => watch_debug!("ignoring student link without a course code: {href}"),
        }
    }
    Ok(courses)
}

/// Lists one course's exercises. Malformed rows are dropped one by one and
/// reported as warnings so the rest of the course still comes through.
pub async fn list_exercises(
    session: &PortalSession,
    course: &Course,
) -> Result<(Vec<Exercise>, Vec<ScrapeWarning>), ScrapeError> {
    let html = session.get(&course.url).await?;

    let mut exercises = Vec::new();
    let mut warnings = Vec::new();
    let mut warn = |exercise_id: String, reason: String| {
        warnings.push(ScrapeWarning {
            course: course.code.clone(),
            exercise_id,
            reason,
        });
    };

    for entry in extract::exercise_entries(&html) {
        let id = match exercise_id(&entry.href) {
            Some(id) => id.to_string(),
            None => {
                warn(entry.href.clone(), "exercise link has no id segment".to_string());
                continue;
            }
        };
        let name = match entry.name {
            Some(name) => name,
            None => {
                warn(id, "exercise name block missing".to_string());
                continue;
            }
        };
        let raw_status = match entry.raw_status {
            Some(raw) => raw,
            None => {
                warn(id, "status block missing".to_string());
                continue;
            }
        };
        match parse_status(&raw_status) {
            Ok(status) => exercises.push(Exercise { id, name, status }),
            Err(err) => warn(id, err.to_string()),
        }
    }

    Ok((exercises, warnings))
}

/// Assembles one complete snapshot over `courses`, preserving their order.
///
/// Course pages are fetched with bounded parallelism against the shared
/// read-only session. Any course-level failure aborts the whole snapshot:
/// a missing course must never look like a course with no exercises.
pub async fn snapshot(
    session: &PortalSession,
    courses: &[Course],
) -> Result<(Snapshot, Vec<ScrapeWarning>), ScrapeError> {
    let mut results = stream::iter(courses.iter().map(|course| async move {
        let (exercises, warnings) = list_exercises(session, course).await?;
        Ok::<_, ScrapeError>((course.code.clone(), exercises, warnings))
    }))
    .buffered(MAX_CONCURRENT_COURSE_FETCHES);

    let mut entries = Vec::with_capacity(courses.len());
    let mut all_warnings = Vec::new();
    while let Some(result) = results.next().await {
        let (code, exercises, warnings) = result?;
        all_warnings.extend(warnings);
        entries.push(CourseExercises { code, exercises });
    }

    Ok((Snapshot::new(entries), all_warnings))
}

fn exercise_id(href: &str) -> Option<&str> {
    href.split('/').rev().find(|segment| !segment.is_empty())
}
