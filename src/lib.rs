//! microfwd - Micro NDN Forwarder
//!
//! A compact, in-process packet forwarder for NDN-style content-centric
//! networks: faces over TCP/UDP/in-process transports, on-demand face
//! creation from listen channels, a multicast FIB, a PIT with
//! duplicate-nonce suppression, and an in-band localhost control plane
//! for prefix registration.

pub mod config;
pub mod dataplane;
pub mod error;
pub mod protocol;
pub mod telemetry;
pub mod transport;

pub use error::{Error, Result};
