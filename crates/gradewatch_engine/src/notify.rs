use gradewatch_core::{Change, ChangeKind, ExerciseStatus};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

/// Substitution placeholder in the subject template.
pub const SUBJECT_COURSE_PLACEHOLDER: &str = "{course_code}";

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipient: String,
    pub subject_format: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not assemble mail message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("mail delivery failed: {0}")]
    Delivery(#[from] lettre::transport::smtp::Error),
}

/// Subject line: the template with the deduplicated, comma-joined codes of
/// every affected course substituted in.
pub fn render_subject(changes: &[Change], subject_format: &str) -> String {
    let mut codes: Vec<&str> = Vec::new();
    for change in changes {
        if !codes.contains(&change.course.as_str()) {
            codes.push(&change.course);
        }
    }
    subject_format.replace(SUBJECT_COURSE_PLACEHOLDER, &codes.join(", "))
}

/// Body: one line per change, in change-set order, under a timestamp line.
pub fn render_body(changes: &[Change], observed_at: &str) -> String {
    let mut body = format!("Observed at {observed_at}:\n\n");
    for change in changes {
        body.push_str(&render_change(change));
        body.push('\n');
    }
    body
}

fn render_change(change: &Change) -> String {
    let where_ = format!("{}/{}", change.course, change.exercise_id);
    match change.kind {
        ChangeKind::Added => format!("{where_}: added ({})", status_text(change.after)),
        ChangeKind::Removed => format!("{where_}: removed (was {})", status_text(change.before)),
        ChangeKind::Modified => format!(
            "{where_}: changed ({} -> {})",
            status_text(change.before),
            status_text(change.after)
        ),
    }
}

fn status_text(status: Option<ExerciseStatus>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "unknown".to_string(),
    }
}

/// Delivers one notification enumerating `changes`.
///
/// An empty change set short-circuits to `Ok` without opening a
/// connection. Delivery is connect -> STARTTLS upgrade -> AUTH -> submit;
/// any failure along that path is reported, not retried — the next cycle
/// only mails again if the portal changes again.
pub fn notify(
    changes: &[Change],
    observed_at: &str,
    settings: &MailSettings,
) -> Result<(), NotifyError> {
    if changes.is_empty() {
        return Ok(());
    }

    let message = Message::builder()
        .from(settings.sender.parse()?)
        .to(settings.recipient.parse()?)
        .subject(render_subject(changes, &settings.subject_format))
        .header(ContentType::TEXT_PLAIN)
        .body(render_body(changes, observed_at))?;

    let mailer = SmtpTransport::starttls_relay(&settings.host)?
        .port(settings.port)
        .credentials(Credentials::new(
            settings.username.clone(),
            settings.password.clone(),
        ))
        .build();
    mailer.send(&message)?;
    Ok(())
}
