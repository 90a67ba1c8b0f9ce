//! PostgreSQL-backed `FeedbackRepository` using Diesel.
//!
//! Transactions run on an owned pooled connection. `find_for_update` issues
//! `SELECT ... FOR UPDATE`, so a second vote on the same row waits for the
//! first transaction to finish and then reads its committed value.
//!
//! A transaction dropped without `commit` or `rollback` returns its
//! connection with the transaction still open. The pool treats such a
//! connection as broken and closes it, and the server rolls the transaction
//! back when the session ends.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::{debug, warn};

use crate::domain::ports::{FeedbackRepository, FeedbackRepositoryError, FeedbackTransaction};
use crate::domain::{Feedback, FeedbackId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{FeedbackRow, FeedbackValues, id_to_db};
use super::pool::DbPool;
use super::schema::feedback;

/// Diesel implementation of [`FeedbackRepository`].
#[derive(Debug, Clone)]
pub struct DieselFeedbackRepository {
    pool: DbPool,
}

impl DieselFeedbackRepository {
    /// Repository drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn rows_to_domain(rows: Vec<FeedbackRow>) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
    rows.into_iter().map(Feedback::try_from).collect()
}

async fn replace_on(
    conn: &mut AsyncPgConnection,
    record: &Feedback,
) -> Result<Feedback, FeedbackRepositoryError> {
    let id = id_to_db(record.id)?;
    let values = FeedbackValues::from_domain(record)?;
    let row: Option<FeedbackRow> = diesel::update(feedback::table.find(id))
        .set(&values)
        .returning(FeedbackRow::as_returning())
        .get_result(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    row.ok_or_else(|| FeedbackRepositoryError::not_found(record.id))?
        .try_into()
}

#[async_trait]
impl FeedbackRepository for DieselFeedbackRepository {
    async fn find_by_id(
        &self,
        id: FeedbackId,
    ) -> Result<Option<Feedback>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<FeedbackRow> = feedback::table
            .find(id_to_db(id)?)
            .select(FeedbackRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Feedback::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FeedbackRow> = feedback::table
            .order(feedback::id.asc())
            .select(FeedbackRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_domain(rows)
    }

    async fn create(&self, record: &Feedback) -> Result<Feedback, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let values = FeedbackValues::from_domain(record)?;
        let row: FeedbackRow = diesel::insert_into(feedback::table)
            .values(&values)
            .returning(FeedbackRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        debug!(feedback_id = row.id, "feedback row inserted");
        row.try_into()
    }

    async fn replace(&self, record: &Feedback) -> Result<Feedback, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        replace_on(&mut conn, record).await
    }

    async fn delete_matching(&self, record: &Feedback) -> Result<bool, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let values = FeedbackValues::from_domain(record)?;
        let matching = diesel::delete(feedback::table)
            .filter(feedback::course.eq(values.course))
            .filter(feedback::body.eq(values.body))
            .filter(feedback::upvotes.eq(values.upvotes))
            .filter(feedback::downvotes.eq(values.downvotes));

        let removed = if record.id.is_blank() {
            matching.execute(&mut conn).await
        } else {
            matching
                .filter(feedback::id.eq(id_to_db(record.id)?))
                .execute(&mut conn)
                .await
        }
        .map_err(map_diesel_error)?;
        debug!(removed, "feedback rows deleted");
        Ok(removed > 0)
    }

    async fn begin(&self) -> Result<Box<dyn FeedbackTransaction>, FeedbackRepositoryError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselFeedbackTransaction { conn }))
    }
}

/// Open transaction on an owned pooled connection.
struct DieselFeedbackTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

#[async_trait]
impl FeedbackTransaction for DieselFeedbackTransaction {
    async fn find_for_update(
        &mut self,
        id: FeedbackId,
    ) -> Result<Option<Feedback>, FeedbackRepositoryError> {
        let row: Option<FeedbackRow> = feedback::table
            .find(id_to_db(id)?)
            .select(FeedbackRow::as_select())
            .for_update()
            .first(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Feedback::try_from).transpose()
    }

    async fn replace(&mut self, record: &Feedback) -> Result<Feedback, FeedbackRepositoryError> {
        replace_on(&mut self.conn, record).await
    }

    async fn commit(mut self: Box<Self>) -> Result<(), FeedbackRepositoryError> {
        AnsiTransactionManager::commit_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), FeedbackRepositoryError> {
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(|err| {
                warn!(error = %err, "feedback transaction rollback failed");
                map_diesel_error(err)
            })
    }
}
