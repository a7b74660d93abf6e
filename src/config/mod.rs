use log::LevelFilter;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::components::persister::PersistPolicy;

pub mod client;
pub mod quotes;
pub mod server;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ENV var {0} is invalid: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub url: Url,
    pub pair: String,
    pub budget: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistConfig {
    pub policy: PersistPolicy,
    /// Ignored by `Unenforced`, replaced by a fixed value under `FaultInjection`.
    pub budget: Duration,
}

impl PersistConfig {
    /// Budget actually applied at the write gate, `None` when the gate is off.
    pub fn effective_budget(&self) -> Option<Duration> {
        match self.policy {
            PersistPolicy::GateThenWrite => Some(self.budget),
            PersistPolicy::Unenforced => None,
            PersistPolicy::FaultInjection => {
                Some(Duration::from_nanos(quotes::FAULT_INJECTION_BUDGET_NS))
            }
        }
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        PersistConfig {
            policy: PersistPolicy::GateThenWrite,
            budget: Duration::from_millis(quotes::PERSIST_BUDGET_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub fetch: FetchConfig,
    pub persist: PersistConfig,
    pub log_level: LevelFilter,
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid(key, format!("{raw:?}: {e}"))),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let ip: IpAddr = parse_var(&lookup, "BIND_ADDR", IpAddr::from(server::BIND_ADDR))?;
        let port: u16 = parse_var(&lookup, "PORT", server::PORT)?;
        let db_path = lookup("DB_PATH").unwrap_or_else(|| server::DB_PATH.to_string());

        let url_raw = lookup("QUOTE_API_URL").unwrap_or_else(|| quotes::QUOTE_API_URL.to_string());
        let url = Url::parse(&url_raw)
            .map_err(|e| ConfigError::Invalid("QUOTE_API_URL", format!("{url_raw:?}: {e}")))?;
        let pair = lookup("QUOTE_PAIR").unwrap_or_else(|| quotes::QUOTE_PAIR.to_string());
        if pair.is_empty() {
            return Err(ConfigError::Invalid("QUOTE_PAIR", "empty".to_string()));
        }
        let fetch_ms: u64 = parse_var(&lookup, "FETCH_BUDGET_MS", quotes::FETCH_BUDGET_MS)?;

        let policy: PersistPolicy =
            parse_var(&lookup, "PERSIST_POLICY", PersistPolicy::GateThenWrite)?;
        let persist_ms: u64 = parse_var(&lookup, "PERSIST_BUDGET_MS", quotes::PERSIST_BUDGET_MS)?;

        let log_level: LevelFilter = parse_var(&lookup, "LOG_LEVEL", LevelFilter::Info)?;

        Ok(Config {
            addr: SocketAddr::new(ip, port),
            db_path: PathBuf::from(db_path),
            fetch: FetchConfig {
                url,
                pair,
                budget: Duration::from_millis(fetch_ms),
            },
            persist: PersistConfig {
                policy,
                budget: Duration::from_millis(persist_ms),
            },
            log_level,
        })
    }
}

/// Settings for the `cotacao-client` binary.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: Url,
    pub pair: String,
    pub file: PathBuf,
    pub budget: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default_url = Url::parse(client::COTACAO_URL)
            .map_err(|e| ConfigError::Invalid("COTACAO_URL", e.to_string()))?;
        let url: Url = parse_var(&lookup, "COTACAO_URL", default_url)?;
        let pair = lookup("QUOTE_PAIR").unwrap_or_else(|| quotes::QUOTE_PAIR.to_string());
        let file = lookup("COTACAO_FILE").unwrap_or_else(|| client::COTACAO_FILE.to_string());
        let budget_ms: u64 = parse_var(&lookup, "CLIENT_BUDGET_MS", client::CLIENT_BUDGET_MS)?;

        Ok(ClientConfig {
            url,
            pair,
            file: PathBuf::from(file),
            budget: Duration::from_millis(budget_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.db_path, PathBuf::from("price.db"));
        assert_eq!(config.fetch.url.as_str(), quotes::QUOTE_API_URL);
        assert_eq!(config.fetch.pair, "USDBRL");
        assert_eq!(config.fetch.budget, Duration::from_millis(200));
        assert_eq!(config.persist, PersistConfig::default());
        assert_eq!(config.persist.budget, Duration::from_millis(10));
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("BIND_ADDR", "127.0.0.1"),
            ("DB_PATH", "/tmp/quotes"),
            ("QUOTE_API_URL", "http://localhost:1234/json/last/EUR-BRL"),
            ("QUOTE_PAIR", "EURBRL"),
            ("FETCH_BUDGET_MS", "500"),
            ("PERSIST_POLICY", "unenforced"),
            ("PERSIST_BUDGET_MS", "25"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 9000)));
        assert_eq!(config.db_path, PathBuf::from("/tmp/quotes"));
        assert_eq!(config.fetch.pair, "EURBRL");
        assert_eq!(config.fetch.budget, Duration::from_millis(500));
        assert_eq!(config.persist.policy, PersistPolicy::Unenforced);
        assert_eq!(config.persist.budget, Duration::from_millis(25));
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("PORT", _)));

        let err = Config::from_lookup(lookup(&[("PERSIST_POLICY", "sometimes")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("PERSIST_POLICY", _)));

        let err = Config::from_lookup(lookup(&[("QUOTE_API_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("QUOTE_API_URL", _)));
    }

    #[test]
    fn effective_budget_follows_policy() {
        let budget = Duration::from_millis(10);
        let gate = PersistConfig {
            policy: PersistPolicy::GateThenWrite,
            budget,
        };
        let unenforced = PersistConfig {
            policy: PersistPolicy::Unenforced,
            budget,
        };
        let fault = PersistConfig {
            policy: PersistPolicy::FaultInjection,
            budget,
        };

        assert_eq!(gate.effective_budget(), Some(budget));
        assert_eq!(unenforced.effective_budget(), None);
        assert_eq!(fault.effective_budget(), Some(Duration::from_nanos(1)));
    }

    #[test]
    fn client_defaults_and_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.url.as_str(), client::COTACAO_URL);
        assert_eq!(config.pair, "USDBRL");
        assert_eq!(config.file, PathBuf::from("cotacao.txt"));
        assert_eq!(config.budget, Duration::from_millis(300));

        let config = ClientConfig::from_lookup(lookup(&[
            ("COTACAO_URL", "http://127.0.0.1:9000/cotacao"),
            ("COTACAO_FILE", "/tmp/bids.txt"),
            ("CLIENT_BUDGET_MS", "50"),
        ]))
        .unwrap();

        assert_eq!(config.url.as_str(), "http://127.0.0.1:9000/cotacao");
        assert_eq!(config.file, PathBuf::from("/tmp/bids.txt"));
        assert_eq!(config.budget, Duration::from_millis(50));
    }

    #[test]
    fn client_invalid_values_name_the_variable() {
        let err = ClientConfig::from_lookup(lookup(&[("CLIENT_BUDGET_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("CLIENT_BUDGET_MS", _)));

        let err = ClientConfig::from_lookup(lookup(&[("COTACAO_URL", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("COTACAO_URL", _)));
    }
}
