//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `PLANNER_*` environment variables, or a
//! configuration file, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use planner::outbound::persistence::PoolConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDRESS: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

/// Runtime configuration for the planner server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PLANNER")]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_address: Option<SocketAddr>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Idle connections kept open.
    #[ortho_config(default = 2)]
    pub pool_min_idle: u32,
    /// Seconds to wait for a pooled connection.
    #[ortho_config(default = 30)]
    pub pool_timeout_secs: u64,
    /// Apply embedded migrations on startup. Unset means true.
    pub run_migrations: Option<bool>,
}

/// Errors raised when settings are incomplete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("database URL is required; set PLANNER_DATABASE_URL or --database-url")]
    MissingDatabaseUrl,
}

impl ServerSettings {
    /// Configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_BIND_ADDRESS))
    }

    /// Whether to apply embedded migrations on startup, defaulting to true.
    ///
    /// Held as an `Option` so an absent CLI flag does not override the
    /// default.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Database URL, which has no default.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool configuration derived from these settings.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.pool_max_size)
            .with_min_idle(Some(self.pool_min_idle))
            .with_connection_timeout(Duration::from_secs(self.pool_timeout_secs)))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "PLANNER_BIND_ADDRESS",
        "PLANNER_DATABASE_URL",
        "PLANNER_POOL_MAX_SIZE",
        "PLANNER_POOL_MIN_IDLE",
        "PLANNER_POOL_TIMEOUT_SECS",
        "PLANNER_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("planner")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_address(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(settings.pool_max_size, 10);
        assert_eq!(settings.pool_min_idle, 2);
        assert_eq!(settings.pool_timeout_secs, 30);
        assert!(settings.run_migrations());
        assert_eq!(
            settings.database_url(),
            Err(SettingsError::MissingDatabaseUrl)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("PLANNER_BIND_ADDRESS", Some("127.0.0.1:9000".to_owned())),
            (
                "PLANNER_DATABASE_URL",
                Some("postgres://planner@localhost/planner".to_owned()),
            ),
            ("PLANNER_POOL_MAX_SIZE", Some("4".to_owned())),
            ("PLANNER_POOL_MIN_IDLE", Some("1".to_owned())),
            ("PLANNER_POOL_TIMEOUT_SECS", Some("5".to_owned())),
            ("PLANNER_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        let pool = settings.pool_config().expect("database url configured");

        assert_eq!(settings.bind_address(), SocketAddr::from(([127, 0, 0, 1], 9000)));
        assert!(!settings.run_migrations());
        assert_eq!(pool.database_url(), "postgres://planner@localhost/planner");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.min_idle(), Some(1));
        assert_eq!(pool.connection_timeout(), Duration::from_secs(5));
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("true"), true)]
    #[case(Some("false"), false)]
    fn migrations_run_unless_disabled(#[case] raw: Option<&str>, #[case] expected: bool) {
        let _guard = lock_env([(
            "PLANNER_RUN_MIGRATIONS",
            raw.map(str::to_owned),
        )]);

        let settings = load_from_empty_args();

        assert_eq!(settings.run_migrations(), expected);
    }

    #[rstest]
    fn blank_database_url_is_rejected() {
        let _guard = lock_env([("PLANNER_DATABASE_URL", Some("  ".to_owned()))]);

        let settings = load_from_empty_args();

        assert!(settings.pool_config().is_err());
    }
}
