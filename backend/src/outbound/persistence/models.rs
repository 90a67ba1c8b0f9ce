//! Diesel row structs for the `feedback` table.
//!
//! Rows use the database's signed integer types. Conversion to and from the
//! domain's unsigned counters is checked; a value that does not fit is
//! reported as a query error rather than truncated.

use diesel::prelude::*;

use crate::domain::ports::FeedbackRepositoryError;
use crate::domain::{Feedback, FeedbackId};

use super::schema::feedback;

/// A stored feedback row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = feedback)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FeedbackRow {
    pub id: i64,
    pub course: String,
    pub body: String,
    pub upvotes: i32,
    pub downvotes: i32,
}

/// Column values written by inserts and updates.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = feedback)]
pub(crate) struct FeedbackValues<'a> {
    pub course: &'a str,
    pub body: &'a str,
    pub upvotes: i32,
    pub downvotes: i32,
}

fn out_of_range(column: &str, value: impl std::fmt::Display) -> FeedbackRepositoryError {
    FeedbackRepositoryError::query(format!("{column} value {value} is out of range"))
}

pub(crate) fn id_to_db(id: FeedbackId) -> Result<i64, FeedbackRepositoryError> {
    i64::try_from(id.get()).map_err(|_| out_of_range("id", id))
}

fn counter_to_db(column: &str, value: u32) -> Result<i32, FeedbackRepositoryError> {
    i32::try_from(value).map_err(|_| out_of_range(column, value))
}

fn counter_from_db(column: &str, value: i32) -> Result<u32, FeedbackRepositoryError> {
    u32::try_from(value).map_err(|_| out_of_range(column, value))
}

impl<'a> FeedbackValues<'a> {
    pub(crate) fn from_domain(record: &'a Feedback) -> Result<Self, FeedbackRepositoryError> {
        Ok(Self {
            course: &record.course,
            body: &record.body,
            upvotes: counter_to_db("upvotes", record.upvotes)?,
            downvotes: counter_to_db("downvotes", record.downvotes)?,
        })
    }
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = FeedbackRepositoryError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id).map_err(|_| out_of_range("id", row.id))?;
        Ok(Self {
            id: FeedbackId::new(id),
            course: row.course,
            body: row.body,
            upvotes: counter_from_db("upvotes", row.upvotes)?,
            downvotes: counter_from_db("downvotes", row.downvotes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> FeedbackRow {
        FeedbackRow {
            id: 17,
            course: "LSINF1121".to_owned(),
            body: "Algorithms explained with plenty of worked examples.".to_owned(),
            upvotes: 12,
            downvotes: 2,
        }
    }

    #[rstest]
    fn rows_convert_into_domain_records(row: FeedbackRow) {
        let record = Feedback::try_from(row).expect("in range");
        assert_eq!(record.id, FeedbackId::new(17));
        assert_eq!(record.upvotes, 12);
        assert_eq!(record.body, "Algorithms explained with plenty of worked examples.");
    }

    #[rstest]
    #[case::negative_id(FeedbackRow { id: -1, ..row() })]
    #[case::negative_votes(FeedbackRow { downvotes: -3, ..row() })]
    fn negative_columns_are_rejected(#[case] bad: FeedbackRow) {
        assert!(Feedback::try_from(bad).is_err());
    }

    #[rstest]
    fn values_borrow_from_the_record(row: FeedbackRow) {
        let record = Feedback::try_from(row).expect("in range");
        let values = FeedbackValues::from_domain(&record).expect("fits");
        assert_eq!(values.course, "LSINF1121");
        assert_eq!((values.upvotes, values.downvotes), (12, 2));
    }

    #[rstest]
    fn oversized_counters_are_rejected() {
        let record = Feedback {
            upvotes: u32::MAX,
            ..Feedback::default()
        };
        let err = FeedbackValues::from_domain(&record).expect_err("too large");
        assert!(err.to_string().contains("upvotes"));
    }
}
