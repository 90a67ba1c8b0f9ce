//! Process-local feedback store.
//!
//! Backs the service when no database is configured and serves as the
//! reference adapter in tests. A single async mutex guards the whole store.
//! A transaction keeps that lock until it ends, so transactions are fully
//! serialized. Writes made inside a transaction are staged and published
//! only on commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::domain::ports::{FeedbackRepository, FeedbackRepositoryError, FeedbackTransaction};
use crate::domain::{Feedback, FeedbackId};

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<FeedbackId, Feedback>,
    last_id: u64,
}

impl StoreState {
    fn next_id(&mut self) -> Result<FeedbackId, FeedbackRepositoryError> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| FeedbackRepositoryError::query("feedback id sequence exhausted"))?;
        self.last_id = next;
        Ok(FeedbackId::new(next))
    }
}

/// In-memory implementation of [`FeedbackRepository`].
///
/// Clones share the same underlying store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedbackRepository {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryFeedbackRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`.
    ///
    /// Records keep their ids; blank ids are assigned in iteration order
    /// after the highest explicit id.
    pub fn with_records(records: impl IntoIterator<Item = Feedback>) -> Self {
        let (with_ids, blanks): (Vec<Feedback>, Vec<Feedback>) =
            records.into_iter().partition(|record| !record.id.is_blank());
        let mut state = StoreState {
            last_id: with_ids.iter().map(|r| r.id.get()).max().unwrap_or(0),
            ..StoreState::default()
        };
        for record in with_ids {
            state.records.insert(record.id, record);
        }
        for mut record in blanks {
            // Seeding is bounded by memory long before the sequence runs out.
            if let Ok(id) = state.next_id() {
                record.id = id;
                state.records.insert(id, record);
            }
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn find_by_id(
        &self,
        id: FeedbackId,
    ) -> Result<Option<Feedback>, FeedbackRepositoryError> {
        Ok(self.state.lock().await.records.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
        Ok(self.state.lock().await.records.values().cloned().collect())
    }

    async fn create(&self, feedback: &Feedback) -> Result<Feedback, FeedbackRepositoryError> {
        let mut state = self.state.lock().await;
        let id = state.next_id()?;
        let record = Feedback {
            id,
            ..feedback.clone()
        };
        state.records.insert(id, record.clone());
        Ok(record)
    }

    async fn replace(&self, feedback: &Feedback) -> Result<Feedback, FeedbackRepositoryError> {
        let mut state = self.state.lock().await;
        let slot = state
            .records
            .get_mut(&feedback.id)
            .ok_or_else(|| FeedbackRepositoryError::not_found(feedback.id))?;
        *slot = feedback.clone();
        Ok(feedback.clone())
    }

    async fn delete_matching(&self, feedback: &Feedback) -> Result<bool, FeedbackRepositoryError> {
        let mut state = self.state.lock().await;
        let before = state.records.len();
        state.records.retain(|id, stored| {
            let id_matches = feedback.id.is_blank() || *id == feedback.id;
            !(id_matches && stored.same_content(feedback))
        });
        let removed = before - state.records.len();
        debug!(removed, "in-memory delete");
        Ok(removed > 0)
    }

    async fn begin(&self) -> Result<Box<dyn FeedbackTransaction>, FeedbackRepositoryError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(InMemoryTransaction {
            guard,
            staged: BTreeMap::new(),
        }))
    }
}

/// Transaction holding the store lock; staged writes die with it unless
/// committed.
struct InMemoryTransaction {
    guard: OwnedMutexGuard<StoreState>,
    staged: BTreeMap<FeedbackId, Feedback>,
}

#[async_trait]
impl FeedbackTransaction for InMemoryTransaction {
    async fn find_for_update(
        &mut self,
        id: FeedbackId,
    ) -> Result<Option<Feedback>, FeedbackRepositoryError> {
        Ok(self
            .staged
            .get(&id)
            .or_else(|| self.guard.records.get(&id))
            .cloned())
    }

    async fn replace(&mut self, feedback: &Feedback) -> Result<Feedback, FeedbackRepositoryError> {
        let known =
            self.staged.contains_key(&feedback.id) || self.guard.records.contains_key(&feedback.id);
        if !known {
            return Err(FeedbackRepositoryError::not_found(feedback.id));
        }
        self.staged.insert(feedback.id, feedback.clone());
        Ok(feedback.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), FeedbackRepositoryError> {
        let Self { mut guard, staged } = *self;
        guard.records.extend(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), FeedbackRepositoryError> {
        Ok(())
    }
}
