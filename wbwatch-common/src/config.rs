//! Configuration loading from the environment
//!
//! All required settings must be present at startup; a missing value is a
//! hard error rather than a silently disabled subsystem. Resolution priority
//! for overridable settings:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Compiled default (fallback)

use crate::{Error, Result};
use std::time::Duration;

/// Default Wildberries card endpoint queried per artikul.
pub const DEFAULT_CARD_URL: &str = "https://card.wb.ru/cards/v1/detail";

/// Default refresh period for subscribed artikuls (30 minutes).
pub const DEFAULT_REFRESH_SECS: u64 = 1800;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot credential token (`BOT_TOKEN`, required)
    pub bot_token: String,
    /// Store connection string (`DATABASE_URL`, required)
    pub database_url: String,
    /// HS256 token-signing secret (`JWT_SECRET`, required)
    pub jwt_secret: String,
    /// HTTP bind address (`WBWATCH_BIND`, default 0.0.0.0:8000)
    pub bind: String,
    /// Period between scheduled refreshes, shared by all subscriptions
    /// (`WBWATCH_REFRESH_SECS`, default 1800)
    pub refresh_interval: Duration,
    /// Marketplace card endpoint (`WB_CARD_URL`); overridable for tests
    pub card_url: String,
    /// Password for the seeded admin account (`ADMIN_PASSWORD`)
    pub admin_password: String,
}

impl Config {
    /// Load configuration, reading `.env` first if present.
    ///
    /// `bind` and `database_url` may be overridden from the command line;
    /// the override wins over the environment.
    pub fn load(cli_bind: Option<&str>, cli_database_url: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = match cli_database_url {
            Some(url) => url.to_string(),
            None => required_var("DATABASE_URL")?,
        };

        let bind = cli_bind
            .map(str::to_string)
            .or_else(|| std::env::var("WBWATCH_BIND").ok())
            .unwrap_or_else(|| "0.0.0.0:8000".to_string());

        let refresh_secs = match std::env::var("WBWATCH_REFRESH_SECS") {
            Ok(value) => value.parse::<u64>().map_err(|_| {
                Error::Config(format!("WBWATCH_REFRESH_SECS is not a valid integer: {value}"))
            })?,
            Err(_) => DEFAULT_REFRESH_SECS,
        };
        if refresh_secs == 0 {
            return Err(Error::Config("WBWATCH_REFRESH_SECS must be non-zero".to_string()));
        }

        Ok(Self {
            bot_token: required_var("BOT_TOKEN")?,
            database_url,
            jwt_secret: required_var("JWT_SECRET")?,
            bind,
            refresh_interval: Duration::from_secs(refresh_secs),
            card_url: std::env::var("WB_CARD_URL").unwrap_or_else(|_| DEFAULT_CARD_URL.to_string()),
            admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "passwd".to_string()),
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{name} is not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_required_vars() {
        std::env::set_var("BOT_TOKEN", "123456:test-token");
        std::env::set_var("DATABASE_URL", "sqlite://wbwatch.db");
        std::env::set_var("JWT_SECRET", "secret");
    }

    fn clear_vars() {
        for name in [
            "BOT_TOKEN",
            "DATABASE_URL",
            "JWT_SECRET",
            "WBWATCH_BIND",
            "WBWATCH_REFRESH_SECS",
            "WB_CARD_URL",
            "ADMIN_PASSWORD",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_missing_required_var_fails_fast() {
        clear_vars();
        std::env::set_var("BOT_TOKEN", "123456:test-token");
        std::env::set_var("JWT_SECRET", "secret");

        let err = Config::load(None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    #[serial]
    fn test_defaults_applied() {
        clear_vars();
        set_required_vars();

        let config = Config::load(None, None).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8000");
        assert_eq!(config.refresh_interval, Duration::from_secs(DEFAULT_REFRESH_SECS));
        assert_eq!(config.card_url, DEFAULT_CARD_URL);
    }

    #[test]
    #[serial]
    fn test_cli_override_wins_over_env() {
        clear_vars();
        set_required_vars();
        std::env::set_var("WBWATCH_BIND", "127.0.0.1:9000");

        let config = Config::load(Some("127.0.0.1:9999"), Some("sqlite://other.db")).unwrap();
        assert_eq!(config.bind, "127.0.0.1:9999");
        assert_eq!(config.database_url, "sqlite://other.db");
    }

    #[test]
    #[serial]
    fn test_invalid_refresh_interval_rejected() {
        clear_vars();
        set_required_vars();
        std::env::set_var("WBWATCH_REFRESH_SECS", "soon");

        let err = Config::load(None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        std::env::set_var("WBWATCH_REFRESH_SECS", "0");
        let err = Config::load(None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
