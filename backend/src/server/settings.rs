//! Service settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `FEEDBACK_*` environment variables or a
//! configuration file, in that order of precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_VOTE_DEADLINE;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 41990;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Failures turning raw settings into usable values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `host` is not an IP address.
    #[error("invalid listen host {host:?}: {message}")]
    InvalidHost { host: String, message: String },
    /// A zero vote deadline would reject every vote.
    #[error("vote deadline must be greater than zero")]
    ZeroVoteDeadline,
}

/// Configuration values controlling the HTTP listener and the record store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FEEDBACK")]
pub struct ServerSettings {
    /// Listen address; defaults to every interface.
    pub host: Option<String>,
    /// Listen port; defaults to 41990.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without one, records live in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: Option<u32>,
    /// Deadline for one vote adjustment, in milliseconds.
    pub vote_deadline_ms: Option<u64>,
    /// Skip embedded migrations at startup.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl ServerSettings {
    /// Socket address the listener binds to.
    ///
    /// # Errors
    /// [`SettingsError::InvalidHost`] when `host` does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip = match self.host.as_deref() {
            Some(host) => host
                .parse::<IpAddr>()
                .map_err(|err| SettingsError::InvalidHost {
                    host: host.to_owned(),
                    message: err.to_string(),
                })?,
            None => DEFAULT_HOST,
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Pool size for the PostgreSQL store.
    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Deadline bounding each vote adjustment.
    ///
    /// # Errors
    /// [`SettingsError::ZeroVoteDeadline`] for `0`.
    pub fn vote_deadline(&self) -> Result<Duration, SettingsError> {
        match self.vote_deadline_ms {
            Some(0) => Err(SettingsError::ZeroVoteDeadline),
            Some(ms) => Ok(Duration::from_millis(ms)),
            None => Ok(DEFAULT_VOTE_DEADLINE),
        }
    }

    /// Whether embedded migrations run before serving.
    pub fn run_migrations(&self) -> bool {
        !self.skip_migrations
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "FEEDBACK_HOST",
        "FEEDBACK_PORT",
        "FEEDBACK_DATABASE_URL",
        "FEEDBACK_DATABASE_MAX_CONNECTIONS",
        "FEEDBACK_VOTE_DEADLINE_MS",
        "FEEDBACK_SKIP_MIGRATIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("feedback-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([0, 0, 0, 0], 41990)))
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.database_max_connections(), 10);
        assert_eq!(settings.vote_deadline(), Ok(DEFAULT_VOTE_DEADLINE));
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("FEEDBACK_HOST", Some("127.0.0.1".to_owned())),
            ("FEEDBACK_PORT", Some("8088".to_owned())),
            (
                "FEEDBACK_DATABASE_URL",
                Some("postgres://feedback@localhost/feedback".to_owned()),
            ),
            ("FEEDBACK_DATABASE_MAX_CONNECTIONS", Some("4".to_owned())),
            ("FEEDBACK_VOTE_DEADLINE_MS", Some("250".to_owned())),
            ("FEEDBACK_SKIP_MIGRATIONS", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([127, 0, 0, 1], 8088)))
        );
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://feedback@localhost/feedback")
        );
        assert_eq!(settings.database_max_connections(), 4);
        assert_eq!(settings.vote_deadline(), Ok(Duration::from_millis(250)));
        assert!(!settings.run_migrations());
    }

    #[rstest]
    fn bad_values_are_rejected() {
        let _guard = lock_env([
            ("FEEDBACK_HOST", Some("not a host".to_owned())),
            ("FEEDBACK_PORT", None),
            ("FEEDBACK_DATABASE_URL", None),
            ("FEEDBACK_DATABASE_MAX_CONNECTIONS", None),
            ("FEEDBACK_VOTE_DEADLINE_MS", Some("0".to_owned())),
            ("FEEDBACK_SKIP_MIGRATIONS", None),
        ]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::InvalidHost { .. })
        ));
        assert_eq!(settings.vote_deadline(), Err(SettingsError::ZeroVoteDeadline));
    }
}
