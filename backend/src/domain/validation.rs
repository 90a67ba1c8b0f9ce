//! Structural validation of feedback records.
//!
//! Rules live in a static table of [`FieldRule`] entries and are evaluated in
//! order. Every violated rule is reported, so a record with five problems
//! yields five [`FieldViolation`]s. A required field that is empty reports
//! only that it is missing; its remaining rules are skipped. Optional fields
//! left at zero are treated as absent.

use std::fmt;

use crate::domain::course_code::is_course_code;
use crate::domain::error::{Error, ErrorCode, ErrorEntry};
use crate::domain::feedback::{BODY_MAX_CHARS, BODY_MIN_CHARS, Feedback, MAX_VOTES};
use crate::domain::text_policy::is_permitted_text;

/// Fields of a [`Feedback`] that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// Store-assigned identifier.
    Id,
    /// Course code.
    Course,
    /// Feedback text.
    Body,
    /// Agreement counter.
    Upvotes,
    /// Disagreement counter.
    Downvotes,
}

impl FieldName {
    /// Label shown to users in error messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Course => "Course",
            Self::Body => "Feedback",
            Self::Upvotes => "Upvotes",
            Self::Downvotes => "Downvotes",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single check applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The field must not be empty.
    Required,
    /// Text must be at least this many characters.
    MinLength(usize),
    /// Text must be at most this many characters.
    MaxLength(usize),
    /// Number must be at least this value.
    AtLeast(u64),
    /// Number must be at most this value.
    AtMost(u64),
    /// Text must be a course code.
    CourseCode,
    /// Text must pass the character policy.
    PermittedText,
}

/// Pairs a field with a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field the rule reads.
    pub field: FieldName,
    /// Check to apply.
    pub rule: Rule,
}

const fn rule(field: FieldName, rule: Rule) -> FieldRule {
    FieldRule { field, rule }
}

/// Rules applied to every feedback record, in evaluation order.
pub const FEEDBACK_RULES: &[FieldRule] = &[
    rule(FieldName::Id, Rule::AtLeast(1)),
    rule(FieldName::Course, Rule::Required),
    rule(FieldName::Course, Rule::CourseCode),
    rule(FieldName::Body, Rule::Required),
    rule(FieldName::Body, Rule::MinLength(BODY_MIN_CHARS)),
    rule(FieldName::Body, Rule::MaxLength(BODY_MAX_CHARS)),
    rule(FieldName::Body, Rule::PermittedText),
    rule(FieldName::Upvotes, Rule::AtMost(MAX_VOTES as u64)),
    rule(FieldName::Downvotes, Rule::AtMost(MAX_VOTES as u64)),
];

#[derive(Debug, Clone, Copy)]
enum FieldValue<'a> {
    Text(&'a str),
    Number(u64),
}

impl FieldValue<'_> {
    fn is_empty(self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Number(n) => n == 0,
        }
    }

    fn render(self) -> String {
        match self {
            Self::Text(text) => text.to_owned(),
            Self::Number(n) => n.to_string(),
        }
    }
}

fn field_value(feedback: &Feedback, field: FieldName) -> FieldValue<'_> {
    match field {
        FieldName::Id => FieldValue::Number(feedback.id.get()),
        FieldName::Course => FieldValue::Text(&feedback.course),
        FieldName::Body => FieldValue::Text(&feedback.body),
        FieldName::Upvotes => FieldValue::Number(u64::from(feedback.upvotes)),
        FieldName::Downvotes => FieldValue::Number(u64::from(feedback.downvotes)),
    }
}

/// Broad class of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationClass {
    /// A required field is empty.
    Missing,
    /// Content does not match a grammar or character policy.
    Format,
    /// A length or numeric bound is exceeded.
    Bound,
}

/// What went wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Required field is empty.
    Missing,
    /// Text shorter than `min` characters.
    TooShort { min: usize, actual: usize },
    /// Text longer than `max` characters.
    TooLong { max: usize, actual: usize },
    /// Number below `min`.
    TooSmall { min: u64, actual: u64 },
    /// Number above `max`.
    TooHigh { max: u64, actual: u64 },
    /// Not a course code.
    InvalidCourse,
    /// Contains characters outside the text policy.
    ForbiddenCharacters,
}

impl ViolationKind {
    /// Class of this violation.
    pub const fn class(self) -> ViolationClass {
        match self {
            Self::Missing => ViolationClass::Missing,
            Self::InvalidCourse | Self::ForbiddenCharacters => ViolationClass::Format,
            Self::TooShort { .. }
            | Self::TooLong { .. }
            | Self::TooSmall { .. }
            | Self::TooHigh { .. } => ViolationClass::Bound,
        }
    }
}

/// One violated rule, with the offending value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Field that failed.
    pub field: FieldName,
    /// How it failed.
    pub kind: ViolationKind,
    /// Submitted value, rendered as text.
    pub value: String,
}

impl FieldViolation {
    /// Short user-facing description.
    pub fn summary(&self) -> String {
        let field = self.field;
        match self.kind {
            ViolationKind::Missing => format!("The {field} field is missing"),
            ViolationKind::TooShort { .. } => format!("The {field} field is too short"),
            ViolationKind::TooLong { .. } => format!("The {field} field is too long"),
            ViolationKind::TooSmall { .. } => format!("The {field} field is too small"),
            ViolationKind::TooHigh { .. } => format!("The {field} field is too high"),
            ViolationKind::InvalidCourse => "The course does not look like a valid course".to_owned(),
            ViolationKind::ForbiddenCharacters => {
                format!("The {field} field contains forbidden characters")
            }
        }
    }

    /// Longer description telling the user how to fix the field.
    pub fn detail(&self) -> String {
        let field = self.field;
        match self.kind {
            ViolationKind::Missing => format!(
                "The {field} field is a required field, however it is empty. Fill the field correctly and try again."
            ),
            ViolationKind::TooShort { min, actual } => format!(
                "The {field} field is too short. It should be at least {min} long, but was {actual}. Elaborate and try again."
            ),
            ViolationKind::TooLong { max, actual } => format!(
                "The {field} field is too long. It should be at most {max} long, but was {actual}. Shorten and try again."
            ),
            ViolationKind::TooSmall { min, actual } => format!(
                "The {field} field is too small. It should be at least {min}, but was {actual}. Increase the value and try again."
            ),
            ViolationKind::TooHigh { max, actual } => format!(
                "The {field} field is too high. It should be at most {max}, but was {actual}. Decrease the value and try again."
            ),
            ViolationKind::InvalidCourse => format!(
                "The course you entered (\"{}\") does not look like a valid course code. Check the code and try again.",
                self.value
            ),
            ViolationKind::ForbiddenCharacters => format!(
                "The {field} field contains forbidden characters. Only letter, numbers and special characters are allowed. Remove all others and try again"
            ),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Non-empty, ordered collection of violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    /// Violations in rule order.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Number of violations; never zero.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying list.
    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summaries: Vec<String> = self.0.iter().map(FieldViolation::summary).collect();
        f.write_str(&summaries.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        let entries = errors
            .0
            .iter()
            .map(|violation| ErrorEntry::new(violation.summary(), violation.detail()));
        Error::from_entries(ErrorCode::InvalidRequest, entries)
            .unwrap_or_else(|| Error::invalid_request("The feedback is invalid", "Check the fields and try again."))
    }
}

fn check(rule: Rule, value: FieldValue<'_>) -> Option<ViolationKind> {
    match (rule, value) {
        (Rule::Required, v) => v.is_empty().then_some(ViolationKind::Missing),
        (Rule::MinLength(min), FieldValue::Text(text)) => {
            let actual = text.chars().count();
            (actual < min).then_some(ViolationKind::TooShort { min, actual })
        }
        (Rule::MaxLength(max), FieldValue::Text(text)) => {
            let actual = text.chars().count();
            (actual > max).then_some(ViolationKind::TooLong { max, actual })
        }
        (Rule::AtLeast(min), FieldValue::Number(actual)) => {
            (actual < min).then_some(ViolationKind::TooSmall { min, actual })
        }
        (Rule::AtMost(max), FieldValue::Number(actual)) => {
            (actual > max).then_some(ViolationKind::TooHigh { max, actual })
        }
        (Rule::CourseCode, FieldValue::Text(text)) => {
            (!is_course_code(text)).then_some(ViolationKind::InvalidCourse)
        }
        (Rule::PermittedText, FieldValue::Text(text)) => {
            (!is_permitted_text(text)).then_some(ViolationKind::ForbiddenCharacters)
        }
        // A rule that does not apply to the field's type never fires.
        _ => None,
    }
}

/// Evaluate `rules` against `feedback`, collecting every violation.
pub fn validate_with(feedback: &Feedback, rules: &[FieldRule]) -> Result<(), ValidationErrors> {
    let mut violations = Vec::new();
    for FieldRule { field, rule } in rules.iter().copied() {
        let value = field_value(feedback, field);
        if rule != Rule::Required && value.is_empty() {
            continue;
        }
        if let Some(kind) = check(rule, value) {
            violations.push(FieldViolation {
                field,
                kind,
                value: value.render(),
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(violations))
    }
}

/// Validate a feedback record against [`FEEDBACK_RULES`].
///
/// # Examples
/// ```
/// use feedback_backend::domain::{Feedback, validate_feedback};
///
/// let ok = Feedback::draft("LINFO1000", "Clear slides and helpful teaching assistants.");
/// assert!(validate_feedback(&ok).is_ok());
///
/// let errors = validate_feedback(&Feedback::draft("", "hi")).unwrap_err();
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors.violations()[0].summary(), "The Course field is missing");
/// ```
pub fn validate_feedback(feedback: &Feedback) -> Result<(), ValidationErrors> {
    validate_with(feedback, FEEDBACK_RULES)
}
