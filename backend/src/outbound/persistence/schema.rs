//! Diesel table definitions.
//!
//! Keep in step with `backend/migrations`.

diesel::table! {
    /// Course feedback with its two vote counters.
    ///
    /// CHECK constraints bound the body to 25..=2000 characters and each
    /// counter to 0..=2000.
    feedback (id) {
        /// Primary key assigned by the `BIGSERIAL` sequence.
        id -> Int8,
        /// Course code, at most 10 characters.
        course -> Varchar,
        /// Feedback text. The SQL column shares the table's name.
        #[sql_name = "feedback"]
        body -> Text,
        /// Agreement votes.
        upvotes -> Int4,
        /// Disagreement votes.
        downvotes -> Int4,
    }
}
