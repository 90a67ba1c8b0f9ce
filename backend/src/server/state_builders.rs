//! Builders turning loaded settings into server dependencies.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::FeedbackRepository;
use crate::outbound::persistence::{
    DbPool, DieselFeedbackRepository, InMemoryFeedbackRepository, MigrationError, PoolConfig,
    PoolError, run_pending_migrations,
};

use super::ServerConfig;
use super::settings::{ServerSettings, SettingsError};

/// Failures preparing the server before it binds.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Migrations(#[from] MigrationError),
}

impl From<StartupError> for std::io::Error {
    fn from(err: StartupError) -> Self {
        std::io::Error::other(err.to_string())
    }
}

/// Pick the record store named by `settings`.
///
/// Without a database URL records live in memory and are lost on exit.
///
/// # Errors
/// Pool construction or migration failures.
pub async fn build_repository(
    settings: &ServerSettings,
) -> Result<Arc<dyn FeedbackRepository>, StartupError> {
    let Some(url) = settings.database_url.as_deref() else {
        info!("no database configured; using the in-memory feedback store");
        return Ok(Arc::new(InMemoryFeedbackRepository::new()));
    };

    if settings.run_migrations() {
        let applied = run_pending_migrations(url.to_owned()).await?;
        info!(applied, "database migrations complete");
    }

    let pool = DbPool::new(
        PoolConfig::new(url).with_max_size(settings.database_max_connections()),
    )
    .await?;
    info!(?pool, "using the PostgreSQL feedback store");
    Ok(Arc::new(DieselFeedbackRepository::new(pool)))
}

/// Assemble a [`ServerConfig`] from `settings`.
///
/// # Errors
/// See [`StartupError`].
pub async fn build_server_config(settings: &ServerSettings) -> Result<ServerConfig, StartupError> {
    let bind_addr = settings.bind_addr()?;
    let vote_deadline = settings.vote_deadline()?;
    let repository = build_repository(settings).await?;
    Ok(ServerConfig::new(bind_addr)
        .with_repository(repository)
        .with_vote_deadline(vote_deadline))
}
