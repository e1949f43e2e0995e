//! NDNLPv2 link protocol wrapper
//!
//! The forwarder only needs two things from an LP packet: the byte
//! range of the enclosed fragment (so the inner Interest/Data can be
//! classified without copying) and whether a Nack header is present.
//! Everything is forwarded as the original outer element, so no LP
//! encoder exists here.

use crate::protocol::tlv::{
    self, TlvReader, TYPE_LP_FRAGMENT, TYPE_LP_NACK, TYPE_LP_NACK_REASON, TYPE_LP_PACKET,
};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct LpPacket {
    /// Byte range of the fragment value within the outer element.
    pub fragment: Option<(usize, usize)>,
    /// Nack reason code when a Nack header is present (0 = unspecified).
    pub nack_reason: Option<u64>,
}

impl LpPacket {
    /// Parse a whole LpPacket element (outer TLV type 100 included).
    pub fn parse(packet: &[u8]) -> Result<Self> {
        let mut outer = TlvReader::new(packet);
        let (typ, value, (value_start, _)) = outer.read_tlv_with_range()?;
        if typ != TYPE_LP_PACKET {
            return Err(Error::Decode(format!("expected LpPacket, got type {}", typ)));
        }

        let mut lp = Self {
            fragment: None,
            nack_reason: None,
        };

        let mut reader = TlvReader::new(value);
        while !reader.is_empty() {
            let (typ, header_value, (start, end)) = reader.read_tlv_with_range()?;
            match typ {
                TYPE_LP_FRAGMENT => {
                    lp.fragment = Some((value_start + start, value_start + end));
                }
                TYPE_LP_NACK => {
                    let mut reason = 0;
                    let mut nack = TlvReader::new(header_value);
                    while !nack.is_empty() {
                        let (nack_typ, nack_value) = nack.read_tlv()?;
                        if nack_typ == TYPE_LP_NACK_REASON {
                            reason = tlv::read_integer(nack_value)?;
                        }
                    }
                    lp.nack_reason = Some(reason);
                }
                // Sequence numbers, congestion marks and other headers
                // are transparent to this forwarder.
                _ => {}
            }
        }

        Ok(lp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::interest::Interest;
    use crate::protocol::name::Name;
    use crate::protocol::tlv::TlvWriter;

    fn wrap_in_lp(inner: &[u8], nack_reason: Option<u64>) -> Vec<u8> {
        let mut value = TlvWriter::new();
        if let Some(reason) = nack_reason {
            let mut nack = TlvWriter::new();
            nack.write_integer_tlv(TYPE_LP_NACK_REASON, reason);
            value.write_tlv(TYPE_LP_NACK, nack.as_slice());
        }
        value.write_tlv(TYPE_LP_FRAGMENT, inner);
        tlv::wrap_tlv(TYPE_LP_PACKET, value.into_vec())
    }

    #[test]
    fn test_fragment_range() {
        let interest = Interest::new(Name::from_uri("/a").unwrap());
        let inner = interest.encode();
        let packet = wrap_in_lp(&inner, None);

        let lp = LpPacket::parse(&packet).unwrap();
        let (start, end) = lp.fragment.unwrap();
        assert_eq!(&packet[start..end], inner.as_slice());
        assert!(lp.nack_reason.is_none());
    }

    #[test]
    fn test_nack_header() {
        let interest = Interest::new(Name::from_uri("/a").unwrap());
        let packet = wrap_in_lp(&interest.encode(), Some(150));

        let lp = LpPacket::parse(&packet).unwrap();
        assert_eq!(lp.nack_reason, Some(150));
        assert!(lp.fragment.is_some());
    }

    #[test]
    fn test_nack_without_reason() {
        let mut value = TlvWriter::new();
        value.write_tlv(TYPE_LP_NACK, &[]);
        let packet = tlv::wrap_tlv(TYPE_LP_PACKET, value.into_vec());

        let lp = LpPacket::parse(&packet).unwrap();
        assert_eq!(lp.nack_reason, Some(0));
        assert!(lp.fragment.is_none());
    }

    #[test]
    fn test_rejects_wrong_outer_type() {
        let interest = Interest::new(Name::from_uri("/a").unwrap());
        assert!(LpPacket::parse(&interest.encode()).is_err());
    }
}
