use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use ferrofolio_core::market::DEFAULT_TIMEOUT_MS;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Server settings, read from `FERROFOLIO_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Portfolio YAML file; the built-in portfolio is used when unset.
    pub portfolio_path: Option<PathBuf>,
    pub log_format: String,
    /// Skip the quote feed entirely and serve degraded snapshots.
    pub offline: bool,
    pub cors_allow: Vec<String>,
    pub quote_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            portfolio_path: None,
            log_format: String::from("text"),
            offline: false,
            cors_allow: vec![String::from("*")],
            quote_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr: SocketAddr = lookup("FERROFOLIO_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("Invalid FERROFOLIO_LISTEN_ADDR")?;
        let portfolio_path = lookup("FERROFOLIO_CONFIG")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let log_format = lookup("FERROFOLIO_LOG_FORMAT").unwrap_or_else(|| "text".into());
        let offline = lookup("FERROFOLIO_OFFLINE")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        let cors_allow = lookup("FERROFOLIO_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let quote_timeout_ms = match lookup("FERROFOLIO_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse()
                .context("Invalid FERROFOLIO_TIMEOUT_MS")?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            listen_addr,
            portfolio_path,
            log_format,
            offline,
            cors_allow,
            quote_timeout_ms,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup(&[])).expect("config");

        assert_eq!(config, Config::default());
        assert_eq!(config.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("FERROFOLIO_LISTEN_ADDR", "0.0.0.0:9000"),
            ("FERROFOLIO_CONFIG", "portfolio.yaml"),
            ("FERROFOLIO_LOG_FORMAT", "json"),
            ("FERROFOLIO_OFFLINE", "TRUE"),
            ("FERROFOLIO_CORS_ALLOW_ORIGINS", "http://a.test, ,http://b.test"),
            ("FERROFOLIO_TIMEOUT_MS", "1500"),
        ]))
        .expect("config");

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.portfolio_path, Some(PathBuf::from("portfolio.yaml")));
        assert_eq!(config.log_format, "json");
        assert!(config.offline);
        assert_eq!(config.cors_allow, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.quote_timeout_ms, 1500);
    }

    #[test]
    fn rejects_bad_listen_addr() {
        let error = Config::from_lookup(lookup(&[("FERROFOLIO_LISTEN_ADDR", "nowhere")]))
            .expect_err("must fail");

        assert!(error.to_string().contains("FERROFOLIO_LISTEN_ADDR"));
    }

    #[test]
    fn unknown_flag_values_are_off() {
        let config =
            Config::from_lookup(lookup(&[("FERROFOLIO_OFFLINE", "maybe")])).expect("config");

        assert!(!config.offline);
    }
}
