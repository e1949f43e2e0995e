//! Interest packet codec
//!
//! Decodes the fields the forwarder acts on (name, nonce, lifetime,
//! CanBePrefix) and skips the rest. Forwarded bytes are always the
//! original element, so a decoded Interest never needs to re-encode
//! byte-exactly; encoding is used for Interests the forwarder itself
//! originates (prefix registration).

use crate::protocol::data::Data;
use crate::protocol::name::Name;
use crate::protocol::tlv::{
    self, TlvReader, TlvWriter, TYPE_APPLICATION_PARAMETERS, TYPE_CAN_BE_PREFIX,
    TYPE_FORWARDING_HINT, TYPE_HOP_LIMIT, TYPE_INTEREST, TYPE_INTEREST_LIFETIME,
    TYPE_MUST_BE_FRESH, TYPE_NAME, TYPE_NONCE,
};
use crate::{Error, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Interest {
    pub name: Name,
    pub can_be_prefix: bool,
    pub must_be_fresh: bool,
    /// Raw nonce bytes; empty when the Interest carried none. Two empty
    /// nonces compare equal for duplicate suppression.
    pub nonce: Vec<u8>,
    pub lifetime: Option<Duration>,
    pub hop_limit: Option<u8>,
}

impl Interest {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            can_be_prefix: false,
            must_be_fresh: false,
            nonce: Vec::new(),
            lifetime: None,
            hop_limit: None,
        }
    }

    /// Parse a whole Interest element (outer TLV type 5 included).
    pub fn parse(packet: &[u8]) -> Result<Self> {
        let mut outer = TlvReader::new(packet);
        let (typ, value) = outer.read_tlv()?;
        if typ != TYPE_INTEREST {
            return Err(Error::Decode(format!("expected Interest, got type {}", typ)));
        }

        let mut reader = TlvReader::new(value);
        let (name_typ, name_value) = reader.read_tlv()?;
        if name_typ != TYPE_NAME {
            return Err(Error::Decode("Interest does not start with a Name".into()));
        }
        let mut interest = Self::new(Name::decode_value(name_value)?);

        while !reader.is_empty() {
            let (typ, value) = reader.read_tlv()?;
            match typ {
                TYPE_CAN_BE_PREFIX => interest.can_be_prefix = true,
                TYPE_MUST_BE_FRESH => interest.must_be_fresh = true,
                TYPE_FORWARDING_HINT => {}
                TYPE_NONCE => interest.nonce = value.to_vec(),
                TYPE_INTEREST_LIFETIME => {
                    interest.lifetime =
                        Some(Duration::from_millis(tlv::read_integer(value)?));
                }
                TYPE_HOP_LIMIT => {
                    if value.len() != 1 {
                        return Err(Error::Decode("HopLimit must be one byte".into()));
                    }
                    interest.hop_limit = Some(value[0]);
                }
                TYPE_APPLICATION_PARAMETERS => {
                    // Parameters and any trailing signature fields are
                    // opaque to the forwarder.
                    break;
                }
                other if tlv::is_critical(other) => {
                    return Err(Error::Decode(format!(
                        "unknown critical TLV type {} in Interest",
                        other
                    )));
                }
                _ => {}
            }
        }

        Ok(interest)
    }

    /// Encode as a whole Interest element.
    pub fn encode(&self) -> Vec<u8> {
        let mut inner = TlvWriter::new();
        self.name.encode_to(&mut inner);
        if self.can_be_prefix {
            inner.write_tlv(TYPE_CAN_BE_PREFIX, &[]);
        }
        if self.must_be_fresh {
            inner.write_tlv(TYPE_MUST_BE_FRESH, &[]);
        }
        if !self.nonce.is_empty() {
            inner.write_tlv(TYPE_NONCE, &self.nonce);
        }
        if let Some(lifetime) = self.lifetime {
            inner.write_integer_tlv(TYPE_INTEREST_LIFETIME, lifetime.as_millis() as u64);
        }
        if let Some(hop_limit) = self.hop_limit {
            inner.write_tlv(TYPE_HOP_LIMIT, &[hop_limit]);
        }
        tlv::wrap_tlv(TYPE_INTEREST, inner.into_vec())
    }

    /// Whether a Data packet satisfies this Interest: exact name match,
    /// or prefix match when CanBePrefix is set. Freshness is a content
    /// store concern and does not apply here.
    pub fn matches_data(&self, data: &Data) -> bool {
        if self.can_be_prefix {
            self.name.is_prefix_of(&data.name)
        } else {
            self.name == data.name
        }
    }
}
