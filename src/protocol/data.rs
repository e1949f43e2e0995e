//! Data packet codec
//!
//! Parsing keeps the fields the forwarder needs for PIT matching and
//! drops the signature (validation is out of scope). Encoding is only
//! used for Data the forwarder originates (control responses), which
//! carry a DigestSha256 integrity digest rather than a key signature.

use crate::protocol::name::Name;
use crate::protocol::tlv::{
    self, TlvReader, TlvWriter, SIGNATURE_DIGEST_SHA256, TYPE_CONTENT, TYPE_CONTENT_TYPE,
    TYPE_DATA, TYPE_FRESHNESS_PERIOD, TYPE_META_INFO, TYPE_NAME, TYPE_SIGNATURE_INFO,
    TYPE_SIGNATURE_TYPE, TYPE_SIGNATURE_VALUE,
};
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Data {
    pub name: Name,
    pub content_type: Option<u64>,
    pub freshness_period: Option<Duration>,
    pub content: Vec<u8>,
}

impl Data {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            content_type: None,
            freshness_period: None,
            content: Vec::new(),
        }
    }

    /// Parse a whole Data element (outer TLV type 6 included).
    pub fn parse(packet: &[u8]) -> Result<Self> {
        let mut outer = TlvReader::new(packet);
        let (typ, value) = outer.read_tlv()?;
        if typ != TYPE_DATA {
            return Err(Error::Decode(format!("expected Data, got type {}", typ)));
        }

        let mut reader = TlvReader::new(value);
        let (name_typ, name_value) = reader.read_tlv()?;
        if name_typ != TYPE_NAME {
            return Err(Error::Decode("Data does not start with a Name".into()));
        }
        let mut data = Self::new(Name::decode_value(name_value)?);

        while !reader.is_empty() {
            let (typ, value) = reader.read_tlv()?;
            match typ {
                TYPE_META_INFO => {
                    let mut meta = TlvReader::new(value);
                    while !meta.is_empty() {
                        let (meta_typ, meta_value) = meta.read_tlv()?;
                        match meta_typ {
                            TYPE_CONTENT_TYPE => {
                                data.content_type = Some(tlv::read_integer(meta_value)?)
                            }
                            TYPE_FRESHNESS_PERIOD => {
                                data.freshness_period =
                                    Some(Duration::from_millis(tlv::read_integer(meta_value)?))
                            }
                            _ => {}
                        }
                    }
                }
                TYPE_CONTENT => data.content = value.to_vec(),
                TYPE_SIGNATURE_INFO | TYPE_SIGNATURE_VALUE => {}
                other if tlv::is_critical(other) => {
                    return Err(Error::Decode(format!(
                        "unknown critical TLV type {} in Data",
                        other
                    )));
                }
                _ => {}
            }
        }

        Ok(data)
    }

    /// Encode as a whole Data element with a DigestSha256 signature:
    /// well-formed on the wire, but carrying no key signature.
    pub fn encode(&self) -> Vec<u8> {
        let mut inner = TlvWriter::new();
        self.name.encode_to(&mut inner);

        let mut meta = TlvWriter::new();
        if let Some(content_type) = self.content_type {
            meta.write_integer_tlv(TYPE_CONTENT_TYPE, content_type);
        }
        if let Some(freshness) = self.freshness_period {
            meta.write_integer_tlv(TYPE_FRESHNESS_PERIOD, freshness.as_millis() as u64);
        }
        if !meta.is_empty() {
            inner.write_tlv(TYPE_META_INFO, meta.as_slice());
        }

        inner.write_tlv(TYPE_CONTENT, &self.content);

        let mut sig_info = TlvWriter::new();
        sig_info.write_integer_tlv(TYPE_SIGNATURE_TYPE, SIGNATURE_DIGEST_SHA256);
        inner.write_tlv(TYPE_SIGNATURE_INFO, sig_info.as_slice());

        // The digest covers Name through SignatureInfo.
        let digest = Sha256::digest(inner.as_slice());
        inner.write_tlv(TYPE_SIGNATURE_VALUE, &digest);

        tlv::wrap_tlv(TYPE_DATA, inner.into_vec())
    }
}
