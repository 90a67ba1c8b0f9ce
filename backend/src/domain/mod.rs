//! Feedback domain: records, validation rules and use cases.
//!
//! Everything here is transport agnostic. Storage is reached through the
//! traits in [`ports`]; HTTP lives in `inbound`.

pub mod course_code;
pub mod error;
pub mod feedback;
pub mod feedback_service;
pub mod ports;
pub mod text_policy;
pub mod trace_id;
pub mod validation;
pub mod vote_service;

pub use self::course_code::{is_course_code, normalize_course_code};
pub use self::error::{Error, ErrorCode, ErrorEntry};
pub use self::feedback::{
    BODY_MAX_CHARS, BODY_MIN_CHARS, COURSE_MAX_STORED_LEN, CounterBoundsError, Feedback,
    FeedbackId, MAX_VOTES, UnknownDeltaError, VoteCounter, VoteDelta,
};
pub use self::feedback_service::FeedbackService;
pub use self::text_policy::{is_permitted_char, is_permitted_text};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::validation::{
    FEEDBACK_RULES, FieldName, FieldRule, FieldViolation, Rule, ValidationErrors,
    ViolationClass, ViolationKind, validate_feedback, validate_with,
};
pub use self::vote_service::{DEFAULT_VOTE_DEADLINE, VoteError, VoteService};
