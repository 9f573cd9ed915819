//! Request payload validation
//!
//! Each resource kind has an ordered table of named checks. The checks run
//! in table order and the first rejection wins, so every malformed payload
//! maps to exactly one message.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::error::CoreError;

const ASSIGNMENT_FIELDS: [&str; 4] = ["name", "points", "num_of_attempts", "deadline"];
const SUBMISSION_FIELD: &str = "submission_url";

/// Smallest accepted value for `points` and `num_of_attempts`
pub const MIN_BOUND: i64 = 1;
/// Largest accepted value for `points` and `num_of_attempts`
pub const MAX_BOUND: i64 = 100;

const MANDATORY_ASSIGNMENT: &str = "Mandatory fields : name, points, num_of_attempts, deadline";
const RESTRICTED_ASSIGNMENT: &str =
    "Restricted : Only name, points, num_of_attempts, deadline are allowed";
const MANDATORY_SUBMISSION: &str = "Mandatory fields : submission_url";

static ARCHIVE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(http|https)://.+\.zip$").unwrap());

/// Result of running a check table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Rejected {
        /// Name of the first failing check
        check: &'static str,
        message: String,
    },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// Rejection message, empty when valid
    pub fn message(&self) -> &str {
        match self {
            Verdict::Valid => "",
            Verdict::Rejected { message, .. } => message,
        }
    }

    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Verdict::Valid => Ok(()),
            Verdict::Rejected { message, .. } => Err(CoreError::Validation(message)),
        }
    }
}

type Payload = Map<String, Value>;

struct Check {
    name: &'static str,
    run: fn(&Payload) -> Option<String>,
}

fn run_checks(checks: &[Check], payload: &Value, mandatory_message: &str) -> Verdict {
    let Some(object) = payload.as_object() else {
        return Verdict::Rejected {
            check: "mandatory_fields",
            message: mandatory_message.to_string(),
        };
    };

    checks
        .iter()
        .find_map(|check| {
            (check.run)(object).map(|message| Verdict::Rejected {
                check: check.name,
                message,
            })
        })
        .unwrap_or(Verdict::Valid)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn bounded_integer(payload: &Payload, field: &str) -> Option<String> {
    let value = payload.get(field)?;
    let in_range = match (value.as_i64(), value.is_u64()) {
        (Some(n), _) => (MIN_BOUND..=MAX_BOUND).contains(&n),
        // integers beyond i64 are integers, just far out of range
        (None, true) => false,
        (None, false) => return Some(format!("Invalid type: {} must be an integer", field)),
    };

    if in_range {
        None
    } else {
        Some(format!(
            "Invalid value: {} must be between {} and {}",
            field, MIN_BOUND, MAX_BOUND
        ))
    }
}

// ==================== Assignment ====================

const ASSIGNMENT_CHECKS: &[Check] = &[
    Check {
        name: "mandatory_fields",
        run: |p| {
            (!ASSIGNMENT_FIELDS.iter().all(|k| p.contains_key(*k)))
                .then(|| MANDATORY_ASSIGNMENT.to_string())
        },
    },
    Check {
        name: "extra_fields",
        run: |p| {
            p.keys()
                .any(|k| !ASSIGNMENT_FIELDS.contains(&k.as_str()))
                .then(|| RESTRICTED_ASSIGNMENT.to_string())
        },
    },
    Check {
        name: "empty_values",
        run: |p| {
            p.values().any(is_empty_value).then(|| {
                "Values cannot be Null : name, points, num_of_attempts, deadline".to_string()
            })
        },
    },
    Check {
        name: "name_type",
        run: |p| {
            (!p.get("name").is_some_and(Value::is_string))
                .then(|| "Type error: Name should be string".to_string())
        },
    },
    Check {
        name: "points",
        run: |p| bounded_integer(p, "points"),
    },
    Check {
        name: "num_of_attempts",
        run: |p| bounded_integer(p, "num_of_attempts"),
    },
];

/// Validate an assignment create/update payload
pub fn check_assignment(payload: &Value) -> Verdict {
    run_checks(ASSIGNMENT_CHECKS, payload, MANDATORY_ASSIGNMENT)
}

/// Typed fields of a validated assignment payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentInput {
    pub name: String,
    pub points: i64,
    pub num_of_attempts: i64,
    pub deadline: DateTime<Utc>,
}

/// Validate an assignment payload and extract its fields
///
/// The deadline must be an RFC 3339 timestamp string.
pub fn parse_assignment(payload: &Value) -> Result<AssignmentInput, CoreError> {
    check_assignment(payload).into_result()?;

    let deadline = payload["deadline"]
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            CoreError::Validation(
                "Invalid value: deadline must be an RFC 3339 timestamp".to_string(),
            )
        })?;

    // Range and type were checked above
    Ok(AssignmentInput {
        name: payload["name"].as_str().unwrap_or_default().to_string(),
        points: payload["points"].as_i64().unwrap_or_default(),
        num_of_attempts: payload["num_of_attempts"].as_i64().unwrap_or_default(),
        deadline,
    })
}

// ==================== Submission ====================

const SUBMISSION_CHECKS: &[Check] = &[
    Check {
        name: "mandatory_fields",
        run: |p| (!p.contains_key(SUBMISSION_FIELD)).then(|| MANDATORY_SUBMISSION.to_string()),
    },
    Check {
        name: "extra_fields",
        run: |p| {
            p.keys()
                .any(|k| k != SUBMISSION_FIELD)
                .then(|| "Restricted : Only submission_url is allowed".to_string())
        },
    },
    Check {
        // Empty and non-string values fall through to the next checks
        name: "url_pattern",
        run: |p| match p.get(SUBMISSION_FIELD) {
            Some(Value::String(url)) if !url.is_empty() && !ARCHIVE_URL_RE.is_match(url) => Some(
                "Invalid format: submission_url must be an http(s) URL ending in .zip".to_string(),
            ),
            _ => None,
        },
    },
    Check {
        name: "empty_values",
        run: |p| {
            p.get(SUBMISSION_FIELD)
                .is_some_and(is_empty_value)
                .then(|| "Values cannot be Null : submission_url".to_string())
        },
    },
    Check {
        name: "url_type",
        run: |p| {
            (!p.get(SUBMISSION_FIELD).is_some_and(Value::is_string))
                .then(|| "Type error: submission_url should be string".to_string())
        },
    },
];

/// Validate a submission payload
pub fn check_submission(payload: &Value) -> Verdict {
    run_checks(SUBMISSION_CHECKS, payload, MANDATORY_SUBMISSION)
}

/// Validate a submission payload and return its URL
pub fn parse_submission(payload: &Value) -> Result<String, CoreError> {
    check_submission(payload).into_result()?;
    Ok(payload[SUBMISSION_FIELD].as_str().unwrap_or_default().to_string())
}
