//! Bounded vote adjustment.
//!
//! A vote changes one counter of one record by exactly one step. The record
//! is read and locked, the new value is checked against `0..=MAX_VOTES` and
//! the full record is written back, all inside one store transaction. Any
//! failure rolls the transaction back, so the stored record is either fully
//! updated or untouched.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::feedback::CounterBoundsError;
use crate::domain::feedback_service::{feedback_not_found, map_repository_error};
use crate::domain::ports::{FeedbackRepository, FeedbackRepositoryError, FeedbackTransaction};
use crate::domain::{Error, Feedback, FeedbackId, VoteCounter, VoteDelta};

/// Deadline applied when none is configured.
pub const DEFAULT_VOTE_DEADLINE: Duration = Duration::from_secs(5);

/// Failures of a vote adjustment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoteError {
    /// No record carries the id.
    #[error("feedback {id} not found")]
    RecordNotFound {
        /// Requested id.
        id: FeedbackId,
    },
    /// The counter is already at a bound.
    #[error(transparent)]
    CounterOutOfBounds(#[from] CounterBoundsError),
    /// The delta was not `+1` or `-1`.
    #[error("unknown delta {delta} for {counter}")]
    UnknownDeltaValue {
        /// Targeted counter.
        counter: VoteCounter,
        /// Rejected delta.
        delta: i64,
    },
    /// The adjustment did not finish before its deadline.
    #[error("vote adjustment exceeded its {deadline:?} deadline")]
    Timeout {
        /// Configured deadline.
        deadline: Duration,
    },
    /// Any other store failure.
    #[error("store failure: {0}")]
    StoreFailure(FeedbackRepositoryError),
}

impl From<FeedbackRepositoryError> for VoteError {
    fn from(err: FeedbackRepositoryError) -> Self {
        match err {
            FeedbackRepositoryError::NotFound { id } => Self::RecordNotFound { id },
            other => Self::StoreFailure(other),
        }
    }
}

impl From<VoteError> for Error {
    fn from(err: VoteError) -> Self {
        let raw = err.to_string();
        match err {
            VoteError::RecordNotFound { .. } => feedback_not_found(raw),
            VoteError::CounterOutOfBounds(CounterBoundsError {
                counter,
                bound,
                current,
            }) => {
                let detail = if bound == 0 {
                    format!(
                        "The feedback {counter} cannot go below {bound}, and it currently has {current}. Refresh the page and try again."
                    )
                } else {
                    format!(
                        "The feedback {counter} cannot go above {bound}, and it currently has {current}. No more can be added."
                    )
                };
                Self::conflict(format!("The {counter} count cannot change further"), detail)
            }
            VoteError::UnknownDeltaValue { counter, delta } => Self::invalid_request(
                "The increment you are attempting to do is invalid",
                format!(
                    "You are trying to increment feedback {counter} by {delta}, but only 1 or -1 is allowed. Correct the values and try again."
                ),
            ),
            VoteError::Timeout { .. } => Self::service_unavailable(
                "The vote could not be recorded in time",
                "The service is busy right now. Wait a moment and try again.",
            ),
            VoteError::StoreFailure(inner) => map_repository_error(inner),
        }
    }
}

/// Applies votes to stored feedback.
#[derive(Debug)]
pub struct VoteService<R: ?Sized> {
    repo: Arc<R>,
    deadline: Duration,
}

impl<R: ?Sized> Clone for VoteService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            deadline: self.deadline,
        }
    }
}

impl<R: ?Sized> VoteService<R> {
    /// Service using [`DEFAULT_VOTE_DEADLINE`].
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            deadline: DEFAULT_VOTE_DEADLINE,
        }
    }

    /// Replace the deadline bounding each adjustment.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Deadline bounding each adjustment.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

impl<R> VoteService<R>
where
    R: FeedbackRepository + ?Sized,
{
    /// Change `counter` of record `id` by `delta`.
    ///
    /// `delta` must be `1` or `-1`; anything else is rejected before the
    /// store is touched.
    ///
    /// # Errors
    /// - [`VoteError::UnknownDeltaValue`] for any other delta.
    /// - [`VoteError::RecordNotFound`] when `id` is unknown.
    /// - [`VoteError::CounterOutOfBounds`] when the counter would leave
    ///   `0..=MAX_VOTES`.
    /// - [`VoteError::Timeout`] when the deadline expires.
    /// - [`VoteError::StoreFailure`] for other store errors.
    pub async fn adjust(
        &self,
        id: FeedbackId,
        counter: VoteCounter,
        delta: i64,
    ) -> Result<Feedback, VoteError> {
        let step = VoteDelta::try_from(delta).map_err(|err| {
            debug!(feedback_id = %id, %counter, delta = err.value, "rejected unknown vote delta");
            VoteError::UnknownDeltaValue {
                counter,
                delta: err.value,
            }
        })?;

        // On expiry the pending future is dropped together with its
        // transaction, which rolls the transaction back.
        match tokio::time::timeout(self.deadline, self.adjust_in_transaction(id, counter, step))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(feedback_id = %id, %counter, deadline = ?self.deadline, "vote adjustment timed out");
                Err(VoteError::Timeout {
                    deadline: self.deadline,
                })
            }
        }
    }

    /// Add one agreement vote.
    pub async fn upvote(&self, id: FeedbackId) -> Result<Feedback, VoteError> {
        self.adjust(id, VoteCounter::Upvotes, VoteDelta::Increment.as_i64())
            .await
    }

    /// Add one disagreement vote.
    pub async fn downvote(&self, id: FeedbackId) -> Result<Feedback, VoteError> {
        self.adjust(id, VoteCounter::Downvotes, VoteDelta::Increment.as_i64())
            .await
    }

    /// Withdraw one agreement vote.
    pub async fn retract_upvote(&self, id: FeedbackId) -> Result<Feedback, VoteError> {
        self.adjust(id, VoteCounter::Upvotes, VoteDelta::Decrement.as_i64())
            .await
    }

    /// Withdraw one disagreement vote.
    pub async fn retract_downvote(&self, id: FeedbackId) -> Result<Feedback, VoteError> {
        self.adjust(id, VoteCounter::Downvotes, VoteDelta::Decrement.as_i64())
            .await
    }

    async fn adjust_in_transaction(
        &self,
        id: FeedbackId,
        counter: VoteCounter,
        step: VoteDelta,
    ) -> Result<Feedback, VoteError> {
        let mut tx = self.repo.begin().await?;
        match Self::apply(&mut *tx, id, counter, step).await {
            Ok(updated) => {
                tx.commit().await?;
                info!(
                    feedback_id = %id,
                    %counter,
                    delta = step.as_i64(),
                    value = updated.votes(counter),
                    "vote recorded"
                );
                Ok(updated)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(feedback_id = %id, error = %rollback_err, "vote rollback failed");
                }
                debug!(feedback_id = %id, %counter, error = %err, "vote rejected");
                Err(err)
            }
        }
    }

    async fn apply(
        tx: &mut dyn FeedbackTransaction,
        id: FeedbackId,
        counter: VoteCounter,
        step: VoteDelta,
    ) -> Result<Feedback, VoteError> {
        let mut record = tx
            .find_for_update(id)
            .await?
            .ok_or(VoteError::RecordNotFound { id })?;
        record.apply_vote(counter, step)?;
        Ok(tx.replace(&record).await?)
    }
}
