use anyhow::{bail, Context};
use std::str::FromStr;

use crate::queue::{
    penalty::{PenaltyPolicy, DEFAULT_BLOCK_DAYS},
    token::{self, DEFAULT_MINUTES_PER_TOKEN},
};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub avg_minutes_per_token: i32,
    pub penalty: PenaltyPolicy,
    pub session_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL not found")?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let avg_minutes_per_token =
            parse_var(&lookup, "AVG_MINUTES_PER_TOKEN", DEFAULT_MINUTES_PER_TOKEN)?;
        token::check_minutes_per_token(avg_minutes_per_token)
            .context("Invalid value for 'AVG_MINUTES_PER_TOKEN'")?;

        let block_days = parse_var(&lookup, "PENALTY_BLOCK_DAYS", DEFAULT_BLOCK_DAYS)?;
        if block_days <= 0 {
            bail!("'PENALTY_BLOCK_DAYS' must be positive");
        }
        let auto_expire = parse_var(&lookup, "AUTO_EXPIRE_BLOCKS", false)?;

        let session_ttl_secs = parse_var(&lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        if session_ttl_secs <= 0 {
            bail!("'SESSION_TTL_SECS' must be positive");
        }

        Ok(Self {
            database_url,
            bind_addr,
            avg_minutes_per_token,
            penalty: PenaltyPolicy {
                block_days,
                auto_expire,
            },
            session_ttl_secs,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for '{}'", key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[("DATABASE_URL", "mysql://localhost/tokenease")]).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.avg_minutes_per_token, 5);
        assert_eq!(config.penalty, PenaltyPolicy::default());
        assert_eq!(config.session_ttl_secs, 3600);
    }

    #[test]
    fn database_url_is_required() {
        assert!(config_from(&[]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("DATABASE_URL", "mysql://localhost/tokenease"),
            ("AVG_MINUTES_PER_TOKEN", "8"),
            ("PENALTY_BLOCK_DAYS", "30"),
            ("AUTO_EXPIRE_BLOCKS", "true"),
        ])
        .unwrap();

        assert_eq!(config.avg_minutes_per_token, 8);
        assert_eq!(config.penalty.block_days, 30);
        assert!(config.penalty.auto_expire);
    }

    #[test]
    fn non_positive_token_rate_fails_start_up() {
        let err = config_from(&[
            ("DATABASE_URL", "mysql://localhost/tokenease"),
            ("AVG_MINUTES_PER_TOKEN", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("AVG_MINUTES_PER_TOKEN"));
    }

    #[test]
    fn garbage_value_names_the_variable() {
        let err = config_from(&[
            ("DATABASE_URL", "mysql://localhost/tokenease"),
            ("PENALTY_BLOCK_DAYS", "two weeks"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("PENALTY_BLOCK_DAYS"));
    }
}
