use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

use reelsmith_db::RetryPolicy;

pub const DEFAULT_SERVER_COMMAND: &str = "uvicorn main:app --host 0.0.0.0 --port 8000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Bootstrap configuration loaded from environment variables.
///
/// The database URL is parsed exactly once, into [`PgConnectOptions`]; the
/// same options are used for logging the target and for connecting.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub database: PgConnectOptions,
    pub retry: RetryPolicy,
    /// Program followed by its arguments.
    pub server_command: Vec<String>,
    pub skip_migrations: bool,
}

impl BootstrapConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default                                        |
    /// |----------------------|------------------------------------------------|
    /// | `DATABASE_URL`       | required                                       |
    /// | `DB_WAIT_ATTEMPTS`   | `30`                                           |
    /// | `DB_WAIT_DELAY_SECS` | `2`                                            |
    /// | `SERVER_COMMAND`     | `uvicorn main:app --host 0.0.0.0 --port 8000`  |
    /// | `SKIP_MIGRATIONS`    | `false`                                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let database =
            PgConnectOptions::from_str(&database_url).map_err(|e| ConfigError::Invalid {
                var: "DATABASE_URL",
                reason: e.to_string(),
            })?;

        let attempts = match get("DB_WAIT_ATTEMPTS") {
            Some(v) => parse_number::<u32>("DB_WAIT_ATTEMPTS", &v)?,
            None => 30,
        };
        if attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_WAIT_ATTEMPTS",
                reason: "must be at least 1".into(),
            });
        }
        let delay_secs = match get("DB_WAIT_DELAY_SECS") {
            Some(v) => parse_number::<u64>("DB_WAIT_DELAY_SECS", &v)?,
            None => 2,
        };

        let server_command = get("SERVER_COMMAND")
            .unwrap_or_else(|| DEFAULT_SERVER_COMMAND.to_string())
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let skip_migrations = match get("SKIP_MIGRATIONS") {
            Some(v) => parse_flag("SKIP_MIGRATIONS", &v)?,
            None => false,
        };

        Ok(Self {
            database,
            retry: RetryPolicy::new(attempts, Duration::from_secs(delay_secs)),
            server_command,
            skip_migrations,
        })
    }

    /// `host:port/database`, for log lines. Never includes credentials.
    pub fn target(&self) -> String {
        format!(
            "{}:{}/{}",
            self.database.get_host(),
            self.database.get_port(),
            self.database.get_database().unwrap_or_default()
        )
    }
}

fn parse_number<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: format!("'{value}': {e}"),
    })
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            reason: format!("'{value}' is not a boolean"),
        }),
    }
}
