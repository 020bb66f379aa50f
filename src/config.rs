//! Runtime settings resolved from command-line flags and environment.
//!
//! A `.env` file in the working directory is loaded before parsing, so any
//! `LEDGERBOT_*` or `TELEGRAM_BOT_TOKEN` variable may live there.

use anyhow::{Result, bail};

use crate::logger;

pub const DEFAULT_DATABASE: &str = "finance.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Validated settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Path to the SQLite database file
    pub database: String,
    /// Level handed to the logger
    pub log_level: String,
}

impl Settings {
    /// Build settings, letting `verbose` raise the level to `debug`.
    pub fn resolve(database: &str, log_level: &str, verbose: bool) -> Result<Self> {
        let database = database.trim();
        if database.is_empty() {
            bail!("database path must not be empty");
        }

        let log_level = if verbose { "debug" } else { log_level.trim() };
        logger::parse_level(log_level)?;

        Ok(Self {
            database: database.to_string(),
            log_level: log_level.to_lowercase(),
        })
    }
}

/// Load `.env` if present. A missing file is not an error.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Validate a Telegram bot token taken from flags or environment.
pub fn telegram_token(token: Option<&str>) -> Result<String> {
    match token.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => bail!("TELEGRAM_BOT_TOKEN is not set (use --token or the environment)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_defaults() {
        let settings = Settings::resolve(DEFAULT_DATABASE, DEFAULT_LOG_LEVEL, false).unwrap();
        assert_eq!(settings.database, "finance.db");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn verbose_raises_level() {
        let settings = Settings::resolve("ledger.db", "warn", true).unwrap();
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Settings::resolve("", "info", false).is_err());
        assert!(Settings::resolve("ledger.db", "chatty", false).is_err());
    }

    #[test]
    fn token_must_be_present() {
        assert!(telegram_token(None).is_err());
        assert!(telegram_token(Some("   ")).is_err());
        assert_eq!(telegram_token(Some(" 123:abc ")).unwrap(), "123:abc");
    }
}
