//! Feedback use cases.
//!
//! Creation sanitizes the incoming record before validating it; updates and
//! deletes validate the record as given. Deletes only act on a record whose
//! every field still matches what the client last saw.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::ports::{FeedbackRepository, FeedbackRepositoryError};
use crate::domain::vote_service::VoteService;
use crate::domain::{Error, Feedback, FeedbackId, VoteCounter, validate_feedback};

pub(crate) fn feedback_not_found(raw: impl Into<String>) -> Error {
    Error::not_found(
        "Feedback not found",
        "The feedback you requested could not be found. Check the ID and try again.",
    )
    .with_entry_debug(raw)
}

pub(crate) fn map_repository_error(err: FeedbackRepositoryError) -> Error {
    let raw = err.to_string();
    match err {
        FeedbackRepositoryError::NotFound { .. } => feedback_not_found(raw),
        FeedbackRepositoryError::Connection { .. } => Error::service_unavailable(
            "The feedback store is unavailable",
            "The service cannot reach its storage right now. Try again later.",
        )
        .with_entry_debug(raw),
        FeedbackRepositoryError::Query { .. } => Error::internal(raw),
    }
}

/// Feedback CRUD plus vote adjustment.
#[derive(Debug)]
pub struct FeedbackService<R: ?Sized> {
    repo: Arc<R>,
    votes: VoteService<R>,
}

impl<R: ?Sized> Clone for FeedbackService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            votes: self.votes.clone(),
        }
    }
}

impl<R: ?Sized> FeedbackService<R> {
    /// Service over `repo` with the default vote deadline.
    pub fn new(repo: Arc<R>) -> Self {
        let votes = VoteService::new(Arc::clone(&repo));
        Self { repo, votes }
    }

    /// Override the deadline bounding vote adjustments.
    #[must_use]
    pub fn with_vote_deadline(mut self, deadline: Duration) -> Self {
        self.votes = self.votes.with_deadline(deadline);
        self
    }

    /// The vote adjuster sharing this service's repository.
    pub fn votes(&self) -> &VoteService<R> {
        &self.votes
    }
}

impl<R> FeedbackService<R>
where
    R: FeedbackRepository + ?Sized,
{
    /// Every stored record.
    pub async fn list(&self) -> Result<Vec<Feedback>, Error> {
        self.repo.list_all().await.map_err(map_repository_error)
    }

    /// One record by id.
    pub async fn get(&self, id: FeedbackId) -> Result<Feedback, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| feedback_not_found(format!("feedback {id} not found")))
    }

    /// Sanitize, validate and store a new record.
    ///
    /// Client-supplied id and counters are discarded first.
    pub async fn create(&self, feedback: Feedback) -> Result<Feedback, Error> {
        let draft = feedback.sanitized_for_creation();
        validate_feedback(&draft)?;
        let created = self
            .repo
            .create(&draft)
            .await
            .map_err(map_repository_error)?;
        info!(feedback_id = %created.id, course = %created.course, "feedback created");
        Ok(created)
    }

    /// Validate and overwrite an existing record.
    pub async fn update(&self, feedback: Feedback) -> Result<Feedback, Error> {
        validate_feedback(&feedback)?;
        if feedback.id.is_blank() {
            return Err(feedback_not_found("update without an id"));
        }
        let updated = self
            .repo
            .replace(&feedback)
            .await
            .map_err(map_repository_error)?;
        info!(feedback_id = %updated.id, "feedback updated");
        Ok(updated)
    }

    /// Validate and delete a record matching every field of `feedback`.
    ///
    /// Returns the deleted content with a blank id.
    pub async fn delete(&self, feedback: Feedback) -> Result<Feedback, Error> {
        validate_feedback(&feedback)?;
        let removed = self
            .repo
            .delete_matching(&feedback)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            debug!(feedback_id = %feedback.id, "no record matched delete request");
            return Err(feedback_not_found(format!(
                "no feedback matched {}",
                feedback.id
            )));
        }
        info!(feedback_id = %feedback.id, "feedback deleted");
        Ok(Feedback {
            id: FeedbackId::BLANK,
            ..feedback
        })
    }

    /// Change one vote counter of a record.
    pub async fn adjust_votes(
        &self,
        id: FeedbackId,
        counter: VoteCounter,
        delta: i64,
    ) -> Result<Feedback, Error> {
        Ok(self.votes.adjust(id, counter, delta).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockFeedbackRepository;
    use rstest::{fixture, rstest};

    #[fixture]
    fn submission() -> Feedback {
        Feedback {
            id: FeedbackId::new(99),
            course: "LEPL1503".to_owned(),
            body: "Project-based, demanding, and very rewarding overall.".to_owned(),
            upvotes: 1200,
            downvotes: 7,
        }
    }

    fn service(repo: MockFeedbackRepository) -> FeedbackService<MockFeedbackRepository> {
        FeedbackService::new(Arc::new(repo))
    }

    #[rstest]
    #[tokio::test]
    async fn create_discards_client_identity_and_votes(submission: Feedback) {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_create()
            .withf(|draft| draft.id.is_blank() && draft.upvotes == 0 && draft.downvotes == 0)
            .times(1)
            .return_once(|draft| {
                Ok(Feedback {
                    id: FeedbackId::new(1),
                    ..draft.clone()
                })
            });

        let created = service(repo)
            .create(submission)
            .await
            .expect("valid submission");
        assert_eq!(created.id, FeedbackId::new(1));
        assert_eq!(created.upvotes, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_invalid_records_before_storing(mut submission: Feedback) {
        submission.course.clear();
        submission.body = "meh".to_owned();
        let repo = MockFeedbackRepository::new();

        let err = service(repo)
            .create(submission)
            .await
            .expect_err("two violations");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.entries().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn create_validates_after_sanitizing(mut submission: Feedback) {
        // Counters above the ceiling are reset, so they never reach validation.
        submission.upvotes = 9999;
        let mut repo = MockFeedbackRepository::new();
        repo.expect_create()
            .times(1)
            .return_once(|draft| Ok(draft.clone()));

        assert!(service(repo).create(submission).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn get_maps_missing_records_to_not_found() {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));

        let err = service(repo)
            .get(FeedbackId::new(5))
            .await
            .expect_err("absent");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.entries()[0].summary, "Feedback not found");
        assert_eq!(
            err.entries()[0].detail,
            "The feedback you requested could not be found. Check the ID and try again."
        );
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_client_counters(submission: Feedback) {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_replace()
            .withf(|record| record.upvotes == 1200 && record.downvotes == 7)
            .times(1)
            .return_once(|record| Ok(record.clone()));

        let updated = service(repo).update(submission).await.expect("stored");
        assert_eq!(updated.upvotes, 1200);
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_unknown_record_is_not_found(submission: Feedback) {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_replace()
            .return_once(|record| Err(FeedbackRepositoryError::not_found(record.id)));

        let err = service(repo).update(submission).await.expect_err("absent");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn update_without_id_is_not_found(mut submission: Feedback) {
        submission.id = FeedbackId::BLANK;
        let err = service(MockFeedbackRepository::new())
            .update(submission)
            .await
            .expect_err("no id");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_returns_the_record_with_a_blank_id(submission: Feedback) {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_delete_matching().times(1).return_once(|_| Ok(true));

        let deleted = service(repo)
            .delete(submission.clone())
            .await
            .expect("matched");
        assert!(deleted.id.is_blank());
        assert!(deleted.same_content(&submission));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_of_a_stale_copy_is_not_found(submission: Feedback) {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_delete_matching().return_once(|_| Ok(false));

        let err = service(repo)
            .delete(submission)
            .await
            .expect_err("stale");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn store_outages_are_service_unavailable() {
        let mut repo = MockFeedbackRepository::new();
        repo.expect_list_all()
            .return_once(|| Err(FeedbackRepositoryError::connection("connection refused")));

        let err = service(repo).list().await.expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        let entry = &err.entries()[0];
        assert!(!entry.detail.contains("refused"));
        assert!(
            entry
                .debug
                .as_deref()
                .is_some_and(|raw| raw.contains("refused"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn adjust_votes_rejects_unknown_deltas_as_invalid_requests() {
        let err = service(MockFeedbackRepository::new())
            .adjust_votes(FeedbackId::new(1), VoteCounter::Upvotes, 10)
            .await
            .expect_err("delta 10");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
