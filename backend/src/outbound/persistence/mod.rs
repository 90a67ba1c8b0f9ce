//! Feedback store adapters.
//!
//! Two implementations of [`crate::domain::ports::FeedbackRepository`]:
//!
//! - [`InMemoryFeedbackRepository`], used when no database is configured;
//! - [`DieselFeedbackRepository`], PostgreSQL through `diesel-async` and a
//!   `bb8` pool.
//!
//! Diesel rows and schema stay private to this module.
//!
//! ```no_run
//! use feedback_backend::outbound::persistence::{DbPool, DieselFeedbackRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/feedback")).await?;
//! let repo = DieselFeedbackRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_feedback_repository;
mod in_memory_feedback_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_feedback_repository::DieselFeedbackRepository;
pub use in_memory_feedback_repository::InMemoryFeedbackRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
