use std::error::Error;
use std::fmt;

/// Grading outcome of a single exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Graded {
    Pass,
    Fail,
    Pending,
}

impl fmt::Display for Graded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Graded::Pass => write!(f, "pass"),
            Graded::Fail => write!(f, "fail"),
            Graded::Pending => write!(f, "----"),
        }
    }
}

/// Fully resolved tri-state status of one exercise. A value of this type
/// only exists when all three fields parsed; there is no partial form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseStatus {
    pub delivered: bool,
    pub corrected: bool,
    pub graded: Graded,
}

impl fmt::Display for ExerciseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        write!(
            f,
            "delivered: {}, corrected: {}, graded: {}",
            yes_no(self.delivered),
            yes_no(self.corrected),
            self.graded
        )
    }
}

/// Which of the three status positions a token was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Delivered,
    Corrected,
    Graded,
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusField::Delivered => write!(f, "delivered"),
            StatusField::Corrected => write!(f, "corrected"),
            StatusField::Graded => write!(f, "graded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusParseError {
    /// The `status:` marker is missing from the text entirely.
    MissingMarker,
    /// Fewer than three comma-separated tokens follow the marker.
    MissingField { field: StatusField },
    /// A token was present but is not in the field's vocabulary.
    UnknownToken { field: StatusField, token: String },
}

impl fmt::Display for StatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusParseError::MissingMarker => {
                write!(f, "status marker `{STATUS_MARKER}` not found")
            }
            StatusParseError::MissingField { field } => {
                write!(f, "no token for field {field}")
            }
            StatusParseError::UnknownToken { field, token } => {
                write!(f, "unknown token `{token}` for field {field}")
            }
        }
    }
}

impl Error for StatusParseError {}

/// Textual marker preceding the three status tokens on the portal's
/// exercise rows.
pub const STATUS_MARKER: &str = "status:";

// The portal renders status in Norwegian only. These tables are the whole
// vocabulary; anything else is malformed input, not a missing translation.
const DELIVERED_TOKENS: &[(&str, bool)] = &[("levert", true), ("ikke levert", false)];
const CORRECTED_TOKENS: &[(&str, bool)] = &[("rettet", true), ("ikke rettet", false)];
const GRADED_TOKENS: &[(&str, Graded)] = &[
    ("godkjent", Graded::Pass),
    ("underkjent", Graded::Fail),
    ("ikke vurdert", Graded::Pending),
];

fn lookup<T: Copy>(table: &[(&str, T)], token: &str) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| *key == token)
        .map(|(_, value)| *value)
}

/// Parses a raw status fragment of the shape
/// `... status: <delivered>, <corrected>, <graded> ...` into an
/// [`ExerciseStatus`].
///
/// Tokens are matched case-insensitively with surrounding whitespace
/// trimmed; tokens past the third are ignored. The result is all-or-nothing:
/// the first unresolvable token fails the whole parse.
pub fn parse_status(raw: &str) -> Result<ExerciseStatus, StatusParseError> {
    let lowered = raw.to_lowercase();
    let start = lowered
        .find(STATUS_MARKER)
        .ok_or(StatusParseError::MissingMarker)?
        + STATUS_MARKER.len();

    let mut tokens = lowered[start..].split(',').map(str::trim);
    let mut next_token = |field: StatusField| {
        tokens
            .next()
            .filter(|token| !token.is_empty())
            .ok_or(StatusParseError::MissingField { field })
    };

    let delivered_token = next_token(StatusField::Delivered)?;
    let corrected_token = next_token(StatusField::Corrected)?;
    let graded_token = next_token(StatusField::Graded)?;

    let resolve = |field: StatusField, token: &str| StatusParseError::UnknownToken {
        field,
        token: token.to_string(),
    };

    let delivered = lookup(DELIVERED_TOKENS, delivered_token)
        .ok_or_else(|| resolve(StatusField::Delivered, delivered_token))?;
    let corrected = lookup(CORRECTED_TOKENS, corrected_token)
        .ok_or_else(|| resolve(StatusField::Corrected, corrected_token))?;
    let graded = lookup(GRADED_TOKENS, graded_token)
        .ok_or_else(|| resolve(StatusField::Graded, graded_token))?;

    Ok(ExerciseStatus {
        delivered,
        corrected,
        graded,
    })
}
