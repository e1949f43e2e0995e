//! Configuration validation

use super::{parse_face_uri, Config};
use crate::protocol::Name;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            eprintln!("[WARN] {}", warning);
        }
        for error in &self.errors {
            eprintln!("[ERROR] {}", error);
        }
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_channels(config, &mut result);
    validate_faces(config, &mut result);
    validate_routes(config, &mut result);
    validate_forwarder(config, &mut result);

    if config.channels.is_empty() && config.faces.is_empty() {
        result.warn("no channels or faces configured; the forwarder will be idle");
    }

    result
}

fn validate_channels(config: &Config, result: &mut ValidationResult) {
    let mut seen: HashSet<String> = HashSet::new();
    for (i, channel) in config.channels.iter().enumerate() {
        if channel.bind.parse::<std::net::SocketAddr>().is_err() {
            result.error(format!(
                "channels[{}]: bind '{}' is not a valid socket address",
                i, channel.bind
            ));
        }
        if !seen.insert(format!("{:?}/{}", channel.protocol, channel.bind)) {
            result.warn(format!(
                "channels[{}]: duplicate channel on '{}'",
                i, channel.bind
            ));
        }
    }
}

fn validate_faces(config: &Config, result: &mut ValidationResult) {
    let mut seen: HashSet<&str> = HashSet::new();
    for (i, face) in config.faces.iter().enumerate() {
        if let Err(e) = parse_face_uri(&face.uri) {
            result.error(format!("faces[{}]: {}", i, e));
        }
        if !seen.insert(face.uri.as_str()) {
            result.warn(format!("faces[{}]: duplicate face uri '{}'", i, face.uri));
        }
    }
}

fn validate_routes(config: &Config, result: &mut ValidationResult) {
    for (i, route) in config.routes.iter().enumerate() {
        if !route.prefix.starts_with('/') {
            result.error(format!(
                "routes[{}]: prefix '{}' must start with '/'",
                i, route.prefix
            ));
        } else if let Err(e) = Name::from_uri(&route.prefix) {
            result.error(format!("routes[{}]: invalid prefix '{}': {}", i, route.prefix, e));
        }

        if !config.faces.iter().any(|f| f.uri == route.face) {
            result.error(format!(
                "routes[{}]: face '{}' is not declared in [[faces]]",
                i, route.face
            ));
        }
    }
}

fn validate_forwarder(config: &Config, result: &mut ValidationResult) {
    if config.forwarder.min_pit_entry_lifetime_secs == 0 {
        result.warn(
            "forwarder.min_pit_entry_lifetime_secs is 0; duplicate-nonce suppression is disabled",
        );
    }
    if config.forwarder.default_interest_lifetime_secs == 0 {
        result.error("forwarder.default_interest_lifetime_secs must be greater than 0");
    }
}
