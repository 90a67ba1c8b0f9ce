//! User-facing error aggregate.
//!
//! Every failure that reaches a client is an [`Error`]: a stable
//! [`ErrorCode`] plus one or more [`ErrorEntry`] values, each pairing a short
//! summary with an actionable detail. Raw internal error text is kept apart
//! in [`ErrorEntry::debug`] and never folded into the summary or detail.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The requested resource does not exist.
    NotFound,
    /// The request conflicts with the current state of the resource.
    Conflict,
    /// A dependency is temporarily unavailable or too slow.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// One user-facing problem description.
///
/// # Examples
/// ```
/// use feedback_backend::domain::ErrorEntry;
///
/// let entry = ErrorEntry::new("Feedback not found", "Check the ID and try again.")
///     .with_debug("record not found");
/// assert_eq!(entry.summary, "Feedback not found");
/// assert_eq!(entry.debug.as_deref(), Some("record not found"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    /// Short message describing what went wrong.
    #[schema(example = "The Course field is missing")]
    pub summary: String,
    /// Longer message explaining why and how to fix it.
    pub detail: String,
    /// Raw internal error text, for operators only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

impl ErrorEntry {
    /// Create an entry without debug information.
    pub fn new(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
            debug: None,
        }
    }

    /// Attach the raw error text that produced this entry.
    #[must_use]
    pub fn with_debug(mut self, debug: impl Into<String>) -> Self {
        self.debug = Some(debug.into());
        self
    }
}

/// Domain error payload aggregating one or more entries.
///
/// ## Invariants
/// - `errors` is never empty.
///
/// # Examples
/// ```
/// use feedback_backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Feedback not found", "Check the ID and try again.");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.entries().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    errors: Vec<ErrorEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

impl Error {
    /// Build an error from its first entry.
    ///
    /// Captures the current trace identifier if one is in scope.
    pub fn new(code: ErrorCode, entry: ErrorEntry) -> Self {
        Self {
            code,
            errors: vec![entry],
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Build an error from several entries, or `None` when there are none.
    pub fn from_entries(code: ErrorCode, entries: impl IntoIterator<Item = ErrorEntry>) -> Option<Self> {
        let errors: Vec<ErrorEntry> = entries.into_iter().collect();
        if errors.is_empty() {
            return None;
        }
        Some(Self {
            code,
            errors,
            trace_id: TraceId::current().map(|id| id.to_string()),
        })
    }

    /// Append another entry.
    #[must_use]
    pub fn with_entry(mut self, entry: ErrorEntry) -> Self {
        self.errors.push(entry);
        self
    }

    /// Attach raw error text to the most recently added entry.
    #[must_use]
    pub fn with_entry_debug(mut self, raw: impl Into<String>) -> Self {
        if let Some(entry) = self.errors.last_mut() {
            entry.debug = Some(raw.into());
        }
        self
    }

    /// Override the trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Entries in the order they were raised.
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.errors
    }

    /// Correlation identifier, if any.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Copy of this error with every `debug` field removed.
    #[must_use]
    pub fn without_debug(&self) -> Self {
        Self {
            code: self.code,
            errors: self
                .errors
                .iter()
                .map(|entry| ErrorEntry::new(entry.summary.clone(), entry.detail.clone()))
                .collect(),
            trace_id: self.trace_id.clone(),
        }
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, ErrorEntry::new(summary, detail))
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, ErrorEntry::new(summary, detail))
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, ErrorEntry::new(summary, detail))
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, ErrorEntry::new(summary, detail))
    }

    /// Internal error carrying the raw cause as debug text.
    pub fn internal(raw: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalError,
            ErrorEntry::new(
                "An internal error occurred",
                "Something went wrong on our side. Try again later.",
            )
            .with_debug(raw),
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for entry in &self.errors {
            if !first {
                writeln!(f)?;
            }
            first = false;
            match &entry.debug {
                Some(debug) => write!(f, "{}: {debug}", entry.summary)?,
                None => write!(f, "{}", entry.summary)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
