//! NDN wire formats
//!
//! The TLV codecs the forwarder consumes, implemented from scratch:
//! only the fields the data plane acts on are decoded, and forwarded
//! packets are never re-encoded.

pub mod control;
pub mod data;
pub mod interest;
pub mod lp;
pub mod name;
pub mod tlv;

pub use control::{ControlParameters, ControlResponse};
pub use data::Data;
pub use interest::Interest;
pub use lp::LpPacket;
pub use name::{Component, Name};
