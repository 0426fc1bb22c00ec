use std::ops::RangeInclusive;

use anyhow::Context;
use serde::Deserialize;

/// Accepted session lifetimes, one minute up to one year.
pub const SESSION_TTL_MINUTES: RangeInclusive<i64> = 1..=525_600;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://app.db?mode=rwc".into());
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("APP_PORT", 8080)?;
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session_id".into()),
            ttl_minutes: check_ttl(parse_var("SESSION_TTL_MINUTES", 60 * 24 * 7)?)?,
            secure_cookie: parse_var("SESSION_COOKIE_SECURE", false)?,
        };
        Ok(Self {
            database_url,
            host,
            port,
            session,
        })
    }
}

fn check_ttl(minutes: i64) -> anyhow::Result<i64> {
    anyhow::ensure!(
        SESSION_TTL_MINUTES.contains(&minutes),
        "SESSION_TTL_MINUTES must be within {}..={}, got {minutes}",
        SESSION_TTL_MINUTES.start(),
        SESSION_TTL_MINUTES.end()
    );
    Ok(minutes)
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_to_default_when_unset() {
        let v: i64 = parse_var("RECIPEBOX_TEST_SURELY_UNSET", 42).expect("default");
        assert_eq!(v, 42);
    }

    #[test]
    fn session_ttl_must_be_positive_and_at_most_a_year() {
        assert_eq!(check_ttl(1).unwrap(), 1);
        assert_eq!(check_ttl(525_600).unwrap(), 525_600);
        assert!(check_ttl(0).is_err());
        assert!(check_ttl(-5).is_err());
        let err = check_ttl(i64::MAX / 2).unwrap_err();
        assert!(err.to_string().contains("SESSION_TTL_MINUTES"));
    }

    #[test]
    fn parse_var_reports_bad_values() {
        std::env::set_var("RECIPEBOX_TEST_BAD_PORT", "not-a-port");
        let err = parse_var::<u16>("RECIPEBOX_TEST_BAD_PORT", 1).unwrap_err();
        assert!(err.to_string().contains("RECIPEBOX_TEST_BAD_PORT"));
    }
}
