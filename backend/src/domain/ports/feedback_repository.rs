//! Port for feedback record storage.
//!
//! [`FeedbackRepository`] covers plain reads and writes. Vote adjustments
//! need a fetch-check-store cycle that other writers cannot interleave with,
//! so the repository also hands out [`FeedbackTransaction`] handles.
//!
//! # Transaction contract
//!
//! - `find_for_update` locks the row until the transaction ends.
//! - Writes made through the handle become visible only after `commit`.
//! - `rollback` discards them explicitly; dropping an uncommitted handle
//!   must discard them as well.

use async_trait::async_trait;

use crate::domain::{Feedback, FeedbackId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by feedback repository adapters.
    pub enum FeedbackRepositoryError {
        /// The store could not be reached or no connection was available.
        Connection { message: String } =>
            "feedback repository connection failed: {message}",
        /// A query or mutation failed while executing.
        Query { message: String } =>
            "feedback repository query failed: {message}",
        /// No record carries the requested identifier.
        NotFound { id: FeedbackId } =>
            "feedback {id} not found",
    }
}

/// Storage for feedback records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Fetch one record, or `None` when the id is unknown.
    async fn find_by_id(&self, id: FeedbackId)
    -> Result<Option<Feedback>, FeedbackRepositoryError>;

    /// Every stored record, ordered by id.
    async fn list_all(&self) -> Result<Vec<Feedback>, FeedbackRepositoryError>;

    /// Insert a record. The store assigns the id; any id on `feedback` is
    /// ignored.
    async fn create(&self, feedback: &Feedback) -> Result<Feedback, FeedbackRepositoryError>;

    /// Overwrite the record with the same id.
    ///
    /// Fails with [`FeedbackRepositoryError::NotFound`] when no such record
    /// exists.
    async fn replace(&self, feedback: &Feedback) -> Result<Feedback, FeedbackRepositoryError>;

    /// Remove records whose course, body and counters all equal those of
    /// `feedback`. When `feedback.id` is not blank only that record is
    /// considered.
    ///
    /// Returns whether anything was removed.
    async fn delete_matching(&self, feedback: &Feedback) -> Result<bool, FeedbackRepositoryError>;

    /// Open a transaction.
    async fn begin(&self) -> Result<Box<dyn FeedbackTransaction>, FeedbackRepositoryError>;
}

/// An open store transaction.
///
/// Consumed by [`FeedbackTransaction::commit`] or
/// [`FeedbackTransaction::rollback`]; dropping it rolls back.
#[async_trait]
pub trait FeedbackTransaction: Send {
    /// Fetch a record and lock it for the rest of the transaction.
    async fn find_for_update(
        &mut self,
        id: FeedbackId,
    ) -> Result<Option<Feedback>, FeedbackRepositoryError>;

    /// Overwrite a record inside the transaction.
    async fn replace(&mut self, feedback: &Feedback) -> Result<Feedback, FeedbackRepositoryError>;

    /// Make every write of this transaction durable.
    async fn commit(self: Box<Self>) -> Result<(), FeedbackRepositoryError>;

    /// Discard every write of this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), FeedbackRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_names_the_id() {
        let err = FeedbackRepositoryError::not_found(FeedbackId::new(12));
        assert_eq!(err.to_string(), "feedback 12 not found");
    }

    #[rstest]
    #[tokio::test]
    async fn mock_repository_reports_missing_records() {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_find_by_id()
            .withf(|id| *id == FeedbackId::new(4))
            .times(1)
            .return_once(|_| Ok(None));

        let found = repo
            .find_by_id(FeedbackId::new(4))
            .await
            .expect("lookup succeeds");
        assert!(found.is_none());
    }
}
