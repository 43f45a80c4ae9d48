//! The `host:port/db` address of a document-database key store.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StoreError};

/// Parsed `--key_store host:port/db` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAddress {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database name.
    pub db: String,
}

impl StoreAddress {
    /// The base URL prefix (`http://host:port/db`) all gateway requests are
    /// built from.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/{}", self.host, self.port, self.db)
    }
}

impl FromStr for StoreAddress {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let (host_port, db) = s
            .split_once('/')
            .ok_or(StoreError::InvalidAddress(s.to_string(), "missing '/db' suffix"))?;
        let (host, port) = host_port
            .split_once(':')
            .ok_or(StoreError::InvalidAddress(s.to_string(), "missing ':port'"))?;
        if host.is_empty() || db.is_empty() {
            return Err(StoreError::InvalidAddress(s.to_string(), "host and db must be non-empty"));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| StoreError::InvalidAddress(s.to_string(), "port is not a u16"))?;
        Ok(StoreAddress {
            host: host.to_string(),
            port,
            db: db.to_string(),
        })
    }
}

impl fmt::Display for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_port_db() {
        let addr: StoreAddress = "localhost:5984/macaa".parse().unwrap();
        assert_eq!(addr.host, "localhost");
        assert_eq!(addr.port, 5984);
        assert_eq!(addr.db, "macaa");
        assert_eq!(addr.base_url(), "http://localhost:5984/macaa");
    }

    #[test]
    fn rejects_missing_db() {
        assert!("localhost:5984".parse::<StoreAddress>().is_err());
    }

    #[test]
    fn rejects_missing_port() {
        assert!("localhost/macaa".parse::<StoreAddress>().is_err());
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!("localhost:abc/macaa".parse::<StoreAddress>().is_err());
    }
}
