//! Server settings
//!
//! Individual values resolve as: CLI flag (or its environment variable,
//! handled by clap) → TOML file → compiled default.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use vsep_common::config::TomlConfig;
use vsep_common::{Error, Result};

/// Resolved settings for the web form server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub session_idle: Duration,
}

impl ServerSettings {
    /// Apply command-line overrides on top of the loaded config.
    pub fn resolve(config: &TomlConfig, bind: Option<&str>, port: Option<u16>) -> Result<Self> {
        let bind = bind.unwrap_or(&config.server.bind);
        let ip: IpAddr = bind
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {:?}: {}", bind, e)))?;
        let port = port.unwrap_or(config.server.port);

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            max_upload_bytes: config.server.max_upload_mb.saturating_mul(1024 * 1024),
            session_idle: Duration::from_secs(config.server.session_idle_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_config() {
        let settings = ServerSettings::resolve(&TomlConfig::default(), None, None).unwrap();
        assert_eq!(settings.addr, "127.0.0.1:5790".parse().unwrap());
        assert_eq!(settings.max_upload_bytes, 200 * 1024 * 1024);
        assert_eq!(settings.session_idle, Duration::from_secs(3600));
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = TomlConfig::default();
        config.server.port = 6000;
        let settings = ServerSettings::resolve(&config, Some("0.0.0.0"), Some(7000)).unwrap();
        assert_eq!(settings.addr, "0.0.0.0:7000".parse().unwrap());

        let settings = ServerSettings::resolve(&config, None, None).unwrap();
        assert_eq!(settings.addr.port(), 6000);
    }

    #[test]
    fn test_bad_bind_address() {
        let err = ServerSettings::resolve(&TomlConfig::default(), Some("localhost:80"), None)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
