use crate::status::ExerciseStatus;

/// A course discovered on the portal frontpage. Identity is `code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub code: String,
    pub url: String,
}

impl Course {
    /// Builds a course from its student-area link, deriving the code from
    /// the fixed path segment (`/student/<code>/...`). Returns `None` for a
    /// link without that segment.
    pub fn from_url(url: impl Into<String>) -> Option<Course> {
        let url = url.into();
        let code = course_code(&url)?.to_string();
        Some(Course { code, url })
    }
}

/// Extracts the course code segment from a student-area path.
pub fn course_code(url: &str) -> Option<&str> {
    url.split('/').nth(2).filter(|segment| !segment.is_empty())
}

/// One exercise row as observed on a course page. Identity within a
/// snapshot is `(course code, id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub status: ExerciseStatus,
}

/// All exercises of one course, in scrape order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseExercises {
    pub code: String,
    pub exercises: Vec<Exercise>,
}

/// One complete poll observation: every tracked course with its exercises,
/// in the order the courses were scraped. Built atomically by the scraper
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub courses: Vec<CourseExercises>,
}

impl Snapshot {
    pub fn new(courses: Vec<CourseExercises>) -> Self {
        Self { courses }
    }

    pub fn course(&self, code: &str) -> Option<&CourseExercises> {
        self.courses.iter().find(|entry| entry.code == code)
    }
}

impl CourseExercises {
    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|exercise| exercise.id == id)
    }
}
