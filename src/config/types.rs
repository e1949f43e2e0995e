//! Configuration types

use crate::telemetry::LogConfig;
use serde::Deserialize;

/// User-defined configuration (config.toml)
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: Option<LogSection>,
    #[serde(default)]
    pub forwarder: ForwarderSection,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub faces: Vec<FaceConfig>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl From<&LogSection> for LogConfig {
    fn from(section: &LogSection) -> Self {
        Self {
            level: section.level.clone(),
            format: section.format.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForwarderSection {
    /// Seconds a PIT entry is retained past its Interest timeout for
    /// duplicate-nonce suppression.
    #[serde(default = "default_min_pit_entry_lifetime_secs")]
    pub min_pit_entry_lifetime_secs: u64,
    /// Seconds assumed for Interests that carry no lifetime.
    #[serde(default = "default_interest_lifetime_secs")]
    pub default_interest_lifetime_secs: u64,
}

impl Default for ForwarderSection {
    fn default() -> Self {
        Self {
            min_pit_entry_lifetime_secs: default_min_pit_entry_lifetime_secs(),
            default_interest_lifetime_secs: default_interest_lifetime_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelProtocol {
    Tcp,
    Udp,
}

/// A listen channel: `{ protocol = "udp", bind = "0.0.0.0:6363" }`
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub protocol: ChannelProtocol,
    pub bind: String,
}

/// A static uplink face: `{ uri = "tcp://hub.example:6363" }`
#[derive(Debug, Clone, Deserialize)]
pub struct FaceConfig {
    pub uri: String,
}

/// A static route installed at startup, referencing a face by its uri.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub prefix: String,
    pub face: String,
    #[serde(default)]
    pub cost: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_min_pit_entry_lifetime_secs() -> u64 {
    60
}

fn default_interest_lifetime_secs() -> u64 {
    4
}
