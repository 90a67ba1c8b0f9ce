//! Driven ports at the edge of the domain.
//!
//! Adapters implement these traits and map their failures onto the typed
//! port errors, keeping storage details out of the domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod feedback_repository;

#[cfg(test)]
pub use feedback_repository::MockFeedbackRepository;
pub use feedback_repository::{
    FeedbackRepository, FeedbackRepositoryError, FeedbackTransaction,
};
