//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the feedback use cases and remain testable without I/O.

use std::sync::Arc;

use crate::domain::FeedbackService;
use crate::domain::ports::FeedbackRepository;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub feedback: FeedbackService<dyn FeedbackRepository>,
}

impl HttpState {
    /// State wrapping an already configured service.
    pub fn new(feedback: FeedbackService<dyn FeedbackRepository>) -> Self {
        Self { feedback }
    }

    /// State over `repo` with default service settings.
    pub fn from_repository(repo: Arc<dyn FeedbackRepository>) -> Self {
        Self::new(FeedbackService::new(repo))
    }
}
