//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use trivia_scoreboard::refresher::DEFAULT_REFRESH_PERIOD;
use trivia_session::domain::session::DEFAULT_TIMER_SECONDS;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PROGRESS_PATH: &str = "trivia-progress.json";
const DEFAULT_LEDGER_TIMEOUT_SECS: u64 = 10;

/// Settings for the API binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// File holding answered sets, turn counts and the roster snapshot.
    pub progress_path: PathBuf,
    /// Countdown for teams without their own timer.
    pub default_timer_seconds: u32,
    /// Upper bound on a single ledger call.
    pub ledger_timeout: Duration,
    /// Live scoreboard refresh period.
    pub scoreboard_refresh: Duration,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or any value
    /// fails to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".to_string())
        })?;

        let default_timer_seconds =
            positive(&lookup, "TRIVIA_DEFAULT_TIMER_SECONDS", DEFAULT_TIMER_SECONDS)?;
        let ledger_timeout = positive(
            &lookup,
            "TRIVIA_LEDGER_TIMEOUT_SECS",
            DEFAULT_LEDGER_TIMEOUT_SECS,
        )?;
        let scoreboard_refresh = positive(
            &lookup,
            "TRIVIA_SCOREBOARD_REFRESH_SECS",
            DEFAULT_REFRESH_PERIOD.as_secs(),
        )?;

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parsed(&lookup, "PORT", DEFAULT_PORT)?,
            progress_path: lookup("TRIVIA_PROGRESS_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_PROGRESS_PATH), PathBuf::from),
            default_timer_seconds,
            ledger_timeout: Duration::from_secs(ledger_timeout),
            scoreboard_refresh: Duration::from_secs(scoreboard_refresh),
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{name} is invalid: {e}"))),
        None => Ok(default),
    }
}

fn positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let value = parsed(lookup, name, default)?;
    if value == T::default() {
        return Err(AppError::Config(format!("{name} must be greater than zero")));
    }
    Ok(value)
}
