//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::DEFAULT_VOTE_DEADLINE;
use crate::domain::ports::FeedbackRepository;
use crate::outbound::persistence::InMemoryFeedbackRepository;

/// Builder-style configuration for creating the HTTP server.
#[derive(Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) repository: Arc<dyn FeedbackRepository>,
    pub(crate) vote_deadline: Duration,
}

impl ServerConfig {
    /// Configuration serving an empty in-memory store on `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            repository: Arc::new(InMemoryFeedbackRepository::new()),
            vote_deadline: DEFAULT_VOTE_DEADLINE,
        }
    }

    /// Serve records from `repository` instead.
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn FeedbackRepository>) -> Self {
        self.repository = repository;
        self
    }

    /// Bound each vote adjustment by `deadline`.
    #[must_use]
    pub fn with_vote_deadline(mut self, deadline: Duration) -> Self {
        self.vote_deadline = deadline;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
