use crate::model::Snapshot;
use crate::status::ExerciseStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// One observed difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub course: String,
    pub exercise_id: String,
    pub kind: ChangeKind,
    pub before: Option<ExerciseStatus>,
    pub after: Option<ExerciseStatus>,
}

/// Compares two snapshots and lists every per-exercise difference.
///
/// `old = None` is the cold start: the result is empty no matter what `new`
/// contains, so the first cycle of a run can never notify.
///
/// Output order is deterministic: courses in `new` scrape order first
/// (within a course: Added/Modified in new scrape order, then Removed in old
/// scrape order), followed by wholly removed courses in `old` scrape order.
pub fn diff(old: Option<&Snapshot>, new: &Snapshot) -> Vec<Change> {
    let old = match old {
        Some(old) => old,
        None => return Vec::new(),
    };

    let mut changes = Vec::new();

    for new_course in &new.courses {
        let old_course = old.course(&new_course.code);
        for exercise in &new_course.exercises {
            match old_course.and_then(|course| course.exercise(&exercise.id)) {
                None => changes.push(Change {
                    course: new_course.code.clone(),
                    exercise_id: exercise.id.clone(),
                    kind: ChangeKind::Added,
                    before: None,
                    after: Some(exercise.status),
                }),
                Some(previous) if previous.status != exercise.status => changes.push(Change {
                    course: new_course.code.clone(),
                    exercise_id: exercise.id.clone(),
                    kind: ChangeKind::Modified,
                    before: Some(previous.status),
                    after: Some(exercise.status),
                }),
                Some(_) => {}
            }
        }
        if let Some(old_course) = old_course {
            for exercise in &old_course.exercises {
                if new_course.exercise(&exercise.id).is_none() {
                    changes.push(Change {
                        course: new_course.code.clone(),
                        exercise_id: exercise.id.clone(),
                        kind: ChangeKind::Removed,
                        before: Some(exercise.status),
                        after: None,
                    });
                }
            }
        }
    }

    for old_course in &old.courses {
        if new.course(&old_course.code).is_some() {
            continue;
        }
        for exercise in &old_course.exercises {
            changes.push(Change {
                course: old_course.code.clone(),
                exercise_id: exercise.id.clone(),
                kind: ChangeKind::Removed,
                before: Some(exercise.status),
                after: None,
            });
        }
    }

    changes
}
