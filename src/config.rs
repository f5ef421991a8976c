//! Runtime configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `ECOSHOP_DATABASE_URL` - SQLite URL for persisted session state
//!   (default: `sqlite://ecoshop.db?mode=rwc`)
//! - `ECOSHOP_HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8083)
//! - `ECOSHOP_SEARCH_DEBOUNCE_MS` - Quiet period for search input (default: 300)
//! - `RUST_LOG` - Log filter (default: info)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use crate::debounce::DEFAULT_QUIET;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://ecoshop.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 8083;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub search_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            search_debounce: DEFAULT_QUIET,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let database_url = lookup("ECOSHOP_DATABASE_URL").unwrap_or(defaults.database_url);
        let host = parse_var(&lookup, "ECOSHOP_HOST")?.unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let search_debounce = parse_var::<u64>(&lookup, "ECOSHOP_SEARCH_DEBOUNCE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.search_debounce);
        Ok(Self { database_url, host, port, search_debounce })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())))
        .transpose()
}
