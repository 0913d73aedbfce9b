use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://fleetme.db?mode=rwc";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    /// Reads the configuration from the process environment.
    /// `./.env.local` should already have been loaded by then.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());

        let addr = lookup("FLEETME_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_owned())
            .parse()
            .context("FLEETME_ADDR is not a valid socket address")?;

        let max_connections = match lookup("FLEETME_MAX_CONNECTIONS") {
            Some(value) => value
                .parse()
                .context("FLEETME_MAX_CONNECTIONS is not a positive integer")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        anyhow::ensure!(max_connections > 0, "FLEETME_MAX_CONNECTIONS must be at least 1");

        Ok(Config {
            database_url,
            addr,
            max_connections,
        })
    }
}
