use std::{fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::Context;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

/// Upper bound for `JWT_TTL_HOURS` (one year).
pub const MAX_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// `None` when `JWT_SECRET` is unset or empty; logins then fail with a 500.
    pub secret: Option<String>,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: PgConnectOptions,
    pub max_connections: u32,
    pub listen_addr: SocketAddr,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source. `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url).context("parse DATABASE_URL")?,
            None => connect_options_from_parts(&lookup)?,
        };
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10u32)?;

        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "APP_PORT", 8080u16)?;
        let listen_addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid APP_HOST {:?}", host))?;

        let ttl_hours = parse_or(&lookup, "JWT_TTL_HOURS", 24i64)?;
        if !(1..=MAX_TTL_HOURS).contains(&ttl_hours) {
            anyhow::bail!(
                "JWT_TTL_HOURS must be between 1 and {}, got {}",
                MAX_TTL_HOURS,
                ttl_hours
            );
        }
        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
            ttl_hours,
        };

        Ok(Self {
            database,
            max_connections,
            listen_addr,
            jwt,
        })
    }
}

/// Credentials go through the typed builder, never into a URL string, so
/// reserved characters in the password stay intact.
fn connect_options_from_parts<F>(lookup: &F) -> anyhow::Result<PgConnectOptions>
where
    F: Fn(&str) -> Option<String>,
{
    let user = lookup("DB_USER").context("neither DATABASE_URL nor DB_USER is set")?;
    let name = lookup("DB_NAME").context("DB_NAME is required when DATABASE_URL is not set")?;
    let host = lookup("DB_HOST").unwrap_or_else(|| "db".into());
    let port = parse_or(lookup, "DB_PORT", 5432u16)?;

    let mut options = PgConnectOptions::new()
        .host(&host)
        .port(port)
        .username(&user)
        .database(&name);
    if let Some(password) = lookup("DB_PASSWORD").filter(|p| !p.is_empty()) {
        options = options.password(&password);
    }
    Ok(options)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {} {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn database_url_wins_over_parts() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://u:p@dbhost:6000/main"),
            ("DB_USER", "other"),
            ("DB_NAME", "ignored"),
            ("DB_HOST", "elsewhere"),
        ])
        .expect("config");
        assert_eq!(cfg.database.get_host(), "dbhost");
        assert_eq!(cfg.database.get_port(), 6000);
        assert_eq!(cfg.database.get_username(), "u");
        assert_eq!(cfg.database.get_database(), Some("main"));
    }

    #[test]
    fn parts_use_defaults_for_host_and_port() {
        let cfg = load(&[("DB_USER", "app"), ("DB_NAME", "accounts")]).expect("config");
        assert_eq!(cfg.database.get_host(), "db");
        assert_eq!(cfg.database.get_port(), 5432);
        assert_eq!(cfg.database.get_username(), "app");
        assert_eq!(cfg.database.get_database(), Some("accounts"));
    }

    #[test]
    fn reserved_characters_in_password_keep_host_and_database() {
        let cfg = load(&[
            ("DB_USER", "app"),
            ("DB_PASSWORD", "p@ss/w#rd:1"),
            ("DB_HOST", "db"),
            ("DB_PORT", "5432"),
            ("DB_NAME", "accounts"),
        ])
        .expect("config");
        assert_eq!(cfg.database.get_host(), "db");
        assert_eq!(cfg.database.get_port(), 5432);
        assert_eq!(cfg.database.get_username(), "app");
        assert_eq!(cfg.database.get_database(), Some("accounts"));
    }

    #[test]
    fn missing_db_name_is_an_error() {
        let err = load(&[("DB_USER", "app")]).unwrap_err();
        assert!(err.to_string().contains("DB_NAME"));
    }

    #[test]
    fn missing_database_settings_is_an_error() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn jwt_and_listener_defaults() {
        let cfg = load(&[("DATABASE_URL", "postgres://u@h/d")]).expect("config");
        assert_eq!(cfg.jwt.ttl_hours, 24);
        assert!(cfg.jwt.secret.is_none());
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn empty_secret_becomes_none() {
        let cfg = load(&[("DATABASE_URL", "postgres://u@h/d"), ("JWT_SECRET", "")])
            .expect("config");
        assert!(cfg.jwt.secret.is_none());

        let cfg = load(&[("DATABASE_URL", "postgres://u@h/d"), ("JWT_SECRET", "k")])
            .expect("config");
        assert_eq!(cfg.jwt.secret.as_deref(), Some("k"));
    }

    #[test]
    fn ttl_outside_bounds_is_rejected() {
        for bad in ["0", "-1", "1000000000", "abc"] {
            let res = load(&[("DATABASE_URL", "postgres://u@h/d"), ("JWT_TTL_HOURS", bad)]);
            assert!(res.is_err(), "JWT_TTL_HOURS={} should be rejected", bad);
        }
        let cfg = load(&[
            ("DATABASE_URL", "postgres://u@h/d"),
            ("JWT_TTL_HOURS", "48"),
        ])
        .expect("config");
        assert_eq!(cfg.jwt.ttl_hours, 48);
    }

    #[test]
    fn listener_address_comes_from_app_host_and_port() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://u@h/d"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "9000"),
        ])
        .expect("config");
        assert_eq!(cfg.listen_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());

        let bad_port = load(&[("DATABASE_URL", "postgres://u@h/d"), ("APP_PORT", "http")]);
        assert!(bad_port.is_err());
    }
}
