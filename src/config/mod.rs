//! Configuration management
//!
//! Loads and validates the forwarder's TOML configuration: listen
//! channels, static uplink faces, startup routes and tuning knobs.

mod types;
mod validation;

pub use types::*;
pub use validation::{validate, ValidationResult};

use crate::dataplane::ForwarderConfig;
use crate::{Error, Result};
use std::path::Path;
use std::time::Duration;

/// Load configuration from a TOML file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let config: Config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
    Ok(config)
}

impl From<&ForwarderSection> for ForwarderConfig {
    fn from(section: &ForwarderSection) -> Self {
        Self {
            min_pit_entry_lifetime: Duration::from_secs(section.min_pit_entry_lifetime_secs),
            default_interest_lifetime: Duration::from_secs(
                section.default_interest_lifetime_secs,
            ),
        }
    }
}

/// Split a face uri like `tcp://host:port` into its parts.
pub fn parse_face_uri(uri: &str) -> Result<(ChannelProtocol, String, u16)> {
    let (protocol, rest) = if let Some(rest) = uri.strip_prefix("tcp://") {
        (ChannelProtocol::Tcp, rest)
    } else if let Some(rest) = uri.strip_prefix("udp://") {
        (ChannelProtocol::Udp, rest)
    } else {
        return Err(Error::InvalidUri(uri.to_string()));
    };

    let (host, port) = rest
        .rsplit_once(':')
        .ok_or_else(|| Error::InvalidUri(uri.to_string()))?;
    if host.is_empty() {
        return Err(Error::InvalidUri(uri.to_string()));
    }
    let port: u16 = port
        .parse()
        .map_err(|_| Error::InvalidUri(uri.to_string()))?;

    Ok((protocol, host.to_string(), port))
}
