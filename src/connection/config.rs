//! Connection configuration.
use std::{borrow::Cow, env::var, fmt};

use crate::common::ByteStr;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3000;

/// wsldb connection config.
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) host: ByteStr,
    pub(crate) port: u16,
}

impl Config {
    /// Create a config from parts.
    pub fn new(host: impl Into<ByteStr>, port: u16) -> Config {
        Self { host: host.into(), port }
    }

    /// Retrieve configuration from environment variables.
    ///
    /// It reads:
    /// - `WSLDB_HOST`
    /// - `WSLDB_PORT`
    ///
    /// Missing or unparsable values fall back to `localhost:3000`.
    pub fn from_env() -> Config {
        let host = match var("WSLDB_HOST") {
            Ok(ok) => ok.into(),
            Err(_) => DEFAULT_HOST.into(),
        };
        let port = var("WSLDB_PORT")
            .ok()
            .and_then(|e| e.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self { host, port }
    }

    /// Parse a `host:port` address.
    pub fn parse(addr: &str) -> Result<Config, ParseError> {
        let Some((host, port)) = addr.rsplit_once(':') else {
            return Err(ParseError { reason: "port missing".into() });
        };

        if host.is_empty() {
            return Err(ParseError { reason: "host missing".into() });
        }

        let Ok(port) = port.parse() else {
            return Err(ParseError { reason: "invalid port".into() });
        };

        Ok(Self { host: ByteStr::copy_from_str(host), port })
    }

    /// The server host name.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The server TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: ByteStr::from_static(DEFAULT_HOST),
            port: DEFAULT_PORT,
        }
    }
}

impl std::str::FromStr for Config {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error when parsing an address.
pub struct ParseError {
    pub(crate) reason: Cow<'static, str>,
}

impl std::error::Error for ParseError { }

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f.write_str(&self.reason);
        }
        write!(f, "failed to parse address: {}", self.reason)
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn parse_host_and_port() {
        let config = Config::parse("localhost:3000").unwrap();
        assert_eq!(config.host(), "localhost");
        assert_eq!(config.port(), 3000);
    }

    #[test]
    fn parse_rejects_bad_addresses() {
        assert!(Config::parse("localhost").is_err());
        assert!(Config::parse(":3000").is_err());
        assert!(Config::parse("localhost:http").is_err());
    }
}
