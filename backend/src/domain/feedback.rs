//! Feedback record and vote counter types.
//!
//! A [`Feedback`] is a short comment tied to a university course code. Two
//! bounded counters track how many people agree (`upvotes`) or disagree
//! (`downvotes`) with it. Identity is owned by the record store: a blank id
//! (`0`) marks a record that has not been persisted yet.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Minimum number of characters in a feedback body.
pub const BODY_MIN_CHARS: usize = 25;
/// Maximum number of characters in a feedback body.
pub const BODY_MAX_CHARS: usize = 2000;
/// Upper bound shared by both vote counters.
pub const MAX_VOTES: u32 = 2000;
/// Column width reserved for course codes by the persistence layer.
pub const COURSE_MAX_STORED_LEN: usize = 10;

/// Store-assigned feedback identifier.
///
/// # Examples
/// ```
/// use feedback_backend::domain::FeedbackId;
///
/// assert!(FeedbackId::BLANK.is_blank());
/// assert!(!FeedbackId::new(7).is_blank());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    ToSchema,
)]
pub struct FeedbackId(u64);

impl FeedbackId {
    /// The blank identifier carried by records that were never persisted.
    pub const BLANK: Self = Self(0);

    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the blank identifier.
    pub const fn is_blank(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FeedbackId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A feedback submission and its vote counters.
///
/// Records arriving from clients are untrusted; run them through
/// [`crate::domain::validate_feedback`] before persisting. The body travels
/// on the wire as `feedback`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Store-assigned identifier, blank until persisted.
    #[serde(default)]
    pub id: FeedbackId,
    /// Course code the feedback refers to, e.g. `LINFO1000`.
    #[serde(default)]
    #[schema(example = "LINFO1000")]
    pub course: String,
    /// Free text of the feedback.
    #[serde(default, rename = "feedback")]
    pub body: String,
    /// Agreement votes.
    #[serde(default)]
    pub upvotes: u32,
    /// Disagreement votes.
    #[serde(default)]
    pub downvotes: u32,
}

impl Feedback {
    /// Build a draft record with a blank id and zeroed counters.
    pub fn draft(course: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: FeedbackId::BLANK,
            course: course.into(),
            body: body.into(),
            upvotes: 0,
            downvotes: 0,
        }
    }

    /// Drop client-supplied identity and counters ahead of creation.
    ///
    /// Only the create path sanitizes; updates and vote adjustments keep
    /// the values they are given.
    ///
    /// # Examples
    /// ```
    /// use feedback_backend::domain::{Feedback, FeedbackId};
    ///
    /// let incoming = Feedback {
    ///     id: FeedbackId::new(42),
    ///     upvotes: 1500,
    ///     ..Feedback::draft("LINFO1000", "A perfectly reasonable comment.")
    /// };
    /// let sanitized = incoming.sanitized_for_creation();
    /// assert!(sanitized.id.is_blank());
    /// assert_eq!(sanitized.upvotes, 0);
    /// ```
    #[must_use]
    pub fn sanitized_for_creation(self) -> Self {
        Self {
            id: FeedbackId::BLANK,
            upvotes: 0,
            downvotes: 0,
            ..self
        }
    }

    /// Whether `other` carries the same course, body and counters.
    ///
    /// Identity is ignored. Deletes use this to refuse acting on a stale
    /// client-held copy.
    pub fn same_content(&self, other: &Self) -> bool {
        self.course == other.course
            && self.body == other.body
            && self.upvotes == other.upvotes
            && self.downvotes == other.downvotes
    }

    /// Current value of the selected counter.
    pub fn votes(&self, counter: VoteCounter) -> u32 {
        match counter {
            VoteCounter::Upvotes => self.upvotes,
            VoteCounter::Downvotes => self.downvotes,
        }
    }

    fn votes_mut(&mut self, counter: VoteCounter) -> &mut u32 {
        match counter {
            VoteCounter::Upvotes => &mut self.upvotes,
            VoteCounter::Downvotes => &mut self.downvotes,
        }
    }

    /// Apply a unit change to one counter, keeping it within `0..=MAX_VOTES`.
    ///
    /// The record is left untouched when the change would leave the range.
    ///
    /// # Errors
    /// Returns [`CounterBoundsError`] carrying the violated bound and the
    /// value the counter held.
    pub fn apply_vote(
        &mut self,
        counter: VoteCounter,
        delta: VoteDelta,
    ) -> Result<u32, CounterBoundsError> {
        let current = self.votes(counter);
        let next = match delta {
            VoteDelta::Increment => current.checked_add(1).filter(|value| *value <= MAX_VOTES),
            VoteDelta::Decrement => current.checked_sub(1),
        };
        let Some(next) = next else {
            let bound = match delta {
                VoteDelta::Increment => MAX_VOTES,
                VoteDelta::Decrement => 0,
            };
            return Err(CounterBoundsError {
                counter,
                bound,
                current,
            });
        };
        *self.votes_mut(counter) = next;
        Ok(next)
    }
}

/// Selects which vote counter an adjustment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoteCounter {
    /// Agreement votes.
    Upvotes,
    /// Disagreement votes.
    Downvotes,
}

impl VoteCounter {
    /// Lower-case name used in messages and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upvotes => "upvotes",
            Self::Downvotes => "downvotes",
        }
    }
}

impl fmt::Display for VoteCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit change of a vote counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteDelta {
    /// `+1`
    Increment,
    /// `-1`
    Decrement,
}

impl VoteDelta {
    /// Signed value of the change.
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Increment => 1,
            Self::Decrement => -1,
        }
    }
}

/// Raised when a delta other than `+1` or `-1` is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown vote delta {value}; only 1 or -1 are allowed")]
pub struct UnknownDeltaError {
    /// The rejected delta.
    pub value: i64,
}

impl TryFrom<i64> for VoteDelta {
    type Error = UnknownDeltaError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Increment),
            -1 => Ok(Self::Decrement),
            other => Err(UnknownDeltaError { value: other }),
        }
    }
}

/// Raised when a counter adjustment would leave `0..=MAX_VOTES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{counter} out of bounds: {current} cannot move past {bound}")]
pub struct CounterBoundsError {
    /// Counter that was targeted.
    pub counter: VoteCounter,
    /// The bound the change would have crossed.
    pub bound: u32,
    /// Counter value before the attempted change.
    pub current: u32,
}
