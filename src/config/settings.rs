//! Runtime settings read from the environment.

use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashMap;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/camps";
pub const DEFAULT_SCHEMA: &str = "camps";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Which store backs the repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            _ => Err(ConfigError::InvalidValue {
                key: "CAMPS_STORE",
                reason: format!("{} (expected postgres or memory)", s),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    /// Schema holding camps, locations, talks and speakers. Validated as a plain identifier.
    pub schema: String,
    pub store: StoreKind,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub seed_data: bool,
    pub body_limit_bytes: usize,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let schema = get("CAMPS_SCHEMA").unwrap_or(DEFAULT_SCHEMA).to_string();
        validate_schema_name(&schema)?;

        let store = match get("CAMPS_STORE") {
            Some(s) => s.parse()?,
            None => StoreKind::Postgres,
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(s) => s.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: "DB_MAX_CONNECTIONS",
                reason: format!("{} is not a positive integer", s),
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_MAX_CONNECTIONS",
                reason: "must be at least 1".into(),
            });
        }

        let seed_data = match get("SEED_DATA") {
            Some(s) => parse_bool("SEED_DATA", s)?,
            None => false,
        };

        let body_limit_bytes = match get("BODY_LIMIT_BYTES") {
            Some(s) => s.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                key: "BODY_LIMIT_BYTES",
                reason: format!("{} is not a byte count", s),
            })?,
            None => DEFAULT_BODY_LIMIT_BYTES,
        };

        Ok(Settings {
            database_url: get("DATABASE_URL").unwrap_or(DEFAULT_DATABASE_URL).to_string(),
            schema,
            store,
            bind_addr,
            max_connections,
            seed_data,
            body_limit_bytes,
        })
    }
}

fn parse_bool(key: &'static str, s: &str) -> Result<bool, ConfigError> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            reason: format!("{} is not a boolean", s),
        }),
    }
}

/// Schema names are interpolated into DDL, so only plain lowercase identifiers are accepted.
pub fn validate_schema_name(name: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").map_err(|e| ConfigError::InvalidSchema(e.to_string()))?;
    if !re.is_match(name) {
        return Err(ConfigError::InvalidSchema(name.to_string()));
    }
    Ok(())
}
