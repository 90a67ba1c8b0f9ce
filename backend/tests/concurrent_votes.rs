//! Concurrent vote adjustment against the in-memory store.

use std::sync::Arc;

use rstest::rstest;

use feedback_backend::domain::ports::FeedbackRepository;
use feedback_backend::domain::{
    Feedback, FeedbackId, MAX_VOTES, VoteCounter, VoteError, VoteService,
};
use feedback_backend::outbound::persistence::InMemoryFeedbackRepository;

const ID: FeedbackId = FeedbackId::new(1);

type Store = Arc<InMemoryFeedbackRepository>;

fn service_with(upvotes: u32, downvotes: u32) -> (Store, VoteService<InMemoryFeedbackRepository>) {
    let repo = Arc::new(InMemoryFeedbackRepository::with_records([Feedback {
        id: ID,
        upvotes,
        downvotes,
        ..Feedback::draft("LINFO1121", "Algorithms explained with plenty of worked examples.")
    }]));
    (Arc::clone(&repo), VoteService::new(repo))
}

async fn stored(repo: &Store) -> Feedback {
    repo.find_by_id(ID)
        .await
        .expect("lookup succeeds")
        .expect("record exists")
}

async fn run_concurrently(
    service: &VoteService<InMemoryFeedbackRepository>,
    counter: VoteCounter,
    delta: i64,
    attempts: usize,
) -> Vec<Result<Feedback, VoteError>> {
    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.adjust(ID, counter, delta).await })
        })
        .collect();

    let mut results = Vec::with_capacity(attempts);
    for handle in handles {
        results.push(handle.await.expect("vote task should not panic"));
    }
    results
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_votes_are_not_lost() {
    let (repo, service) = service_with(0, 0);

    let results = run_concurrently(&service, VoteCounter::Downvotes, 1, 64).await;

    assert!(results.iter().all(Result::is_ok));
    let record = stored(&repo).await;
    assert_eq!(record.downvotes, 64);
    assert_eq!(record.upvotes, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_past_the_ceiling_stops_exactly_at_it() {
    let (repo, service) = service_with(MAX_VOTES - 10, 0);

    let results = run_concurrently(&service, VoteCounter::Upvotes, 1, 25).await;

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(VoteError::CounterOutOfBounds(_))))
        .count();
    assert_eq!(accepted, 10);
    assert_eq!(refused, 15);
    assert_eq!(stored(&repo).await.upvotes, MAX_VOTES);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_past_the_floor_stops_at_zero() {
    let (repo, service) = service_with(0, 3);

    let results = run_concurrently(&service, VoteCounter::Downvotes, -1, 8).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert_eq!(stored(&repo).await.downvotes, 0);
}
