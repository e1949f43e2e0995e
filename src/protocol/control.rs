//! NFD management codecs
//!
//! ControlParameters travel inside a name component of a registration
//! Interest; ControlResponse travels as the content of the reply Data.

use crate::protocol::name::Name;
use crate::protocol::tlv::{
    self, TlvReader, TlvWriter, TYPE_CONTROL_PARAMETERS, TYPE_CONTROL_PARAMETERS_COST,
    TYPE_CONTROL_PARAMETERS_FACE_ID, TYPE_CONTROL_RESPONSE, TYPE_CONTROL_RESPONSE_STATUS_CODE,
    TYPE_CONTROL_RESPONSE_STATUS_TEXT, TYPE_NAME,
};
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct ControlParameters {
    pub name: Option<Name>,
    pub face_id: Option<u64>,
    pub cost: Option<u64>,
}

impl ControlParameters {
    pub fn with_name(name: Name) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    /// Parse a whole ControlParameters TLV (outer type 104 included).
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut outer = TlvReader::new(bytes);
        let (typ, value) = outer.read_tlv()?;
        if typ != TYPE_CONTROL_PARAMETERS {
            return Err(Error::Decode(format!(
                "expected ControlParameters, got type {}",
                typ
            )));
        }

        let mut params = Self::default();
        let mut reader = TlvReader::new(value);
        while !reader.is_empty() {
            let (typ, value) = reader.read_tlv()?;
            match typ {
                TYPE_NAME => params.name = Some(Name::decode_value(value)?),
                TYPE_CONTROL_PARAMETERS_FACE_ID => {
                    params.face_id = Some(tlv::read_integer(value)?)
                }
                TYPE_CONTROL_PARAMETERS_COST => params.cost = Some(tlv::read_integer(value)?),
                _ => {}
            }
        }
        Ok(params)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut inner = TlvWriter::new();
        if let Some(name) = &self.name {
            name.encode_to(&mut inner);
        }
        if let Some(face_id) = self.face_id {
            inner.write_integer_tlv(TYPE_CONTROL_PARAMETERS_FACE_ID, face_id);
        }
        if let Some(cost) = self.cost {
            inner.write_integer_tlv(TYPE_CONTROL_PARAMETERS_COST, cost);
        }
        tlv::wrap_tlv(TYPE_CONTROL_PARAMETERS, inner.into_vec())
    }
}

#[derive(Debug, Clone)]
pub struct ControlResponse {
    pub status_code: u64,
    pub status_text: String,
    pub body: Option<ControlParameters>,
}

impl ControlResponse {
    pub fn success(body: ControlParameters) -> Self {
        Self {
            status_code: 200,
            status_text: "Success".to_string(),
            body: Some(body),
        }
    }

    /// Parse a whole ControlResponse TLV (outer type 101 included).
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut outer = TlvReader::new(bytes);
        let (typ, value) = outer.read_tlv()?;
        if typ != TYPE_CONTROL_RESPONSE {
            return Err(Error::Decode(format!(
                "expected ControlResponse, got type {}",
                typ
            )));
        }

        let mut status_code = None;
        let mut status_text = String::new();
        let mut body = None;

        let mut reader = TlvReader::new(value);
        while !reader.is_empty() {
            let (typ, value) = reader.read_tlv()?;
            match typ {
                TYPE_CONTROL_RESPONSE_STATUS_CODE => {
                    status_code = Some(tlv::read_integer(value)?)
                }
                TYPE_CONTROL_RESPONSE_STATUS_TEXT => {
                    status_text = String::from_utf8_lossy(value).into_owned()
                }
                TYPE_CONTROL_PARAMETERS => {
                    let mut full = TlvWriter::new();
                    full.write_tlv(TYPE_CONTROL_PARAMETERS, value);
                    body = Some(ControlParameters::parse(full.as_slice())?);
                }
                _ => {}
            }
        }

        Ok(Self {
            status_code: status_code
                .ok_or_else(|| Error::Decode("ControlResponse missing StatusCode".into()))?,
            status_text,
            body,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut inner = TlvWriter::new();
        inner.write_integer_tlv(TYPE_CONTROL_RESPONSE_STATUS_CODE, self.status_code);
        inner.write_tlv(
            TYPE_CONTROL_RESPONSE_STATUS_TEXT,
            self.status_text.as_bytes(),
        );
        let mut buf = inner.into_vec();
        if let Some(body) = &self.body {
            buf.extend_from_slice(&body.encode());
        }
        tlv::wrap_tlv(TYPE_CONTROL_RESPONSE, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_parameters_roundtrip() {
        let mut params = ControlParameters::with_name(Name::from_uri("/p/q").unwrap());
        params.cost = Some(10);

        let parsed = ControlParameters::parse(&params.encode()).unwrap();
        assert_eq!(parsed.name.unwrap().to_uri(), "/p/q");
        assert_eq!(parsed.cost, Some(10));
        assert!(parsed.face_id.is_none());
    }

    #[test]
    fn test_control_parameters_rejects_wrong_type() {
        let name = Name::from_uri("/p").unwrap();
        assert!(ControlParameters::parse(&name.encode()).is_err());
    }

    #[test]
    fn test_control_response_roundtrip() {
        let params = ControlParameters::with_name(Name::from_uri("/registered").unwrap());
        let response = ControlResponse::success(params);

        let parsed = ControlResponse::parse(&response.encode()).unwrap();
        assert_eq!(parsed.status_code, 200);
        assert_eq!(parsed.status_text, "Success");
        assert_eq!(parsed.body.unwrap().name.unwrap().to_uri(), "/registered");
    }

    #[test]
    fn test_control_response_requires_status() {
        let mut inner = TlvWriter::new();
        inner.write_tlv(TYPE_CONTROL_RESPONSE_STATUS_TEXT, b"no code");
        let bytes = tlv::wrap_tlv(TYPE_CONTROL_RESPONSE, inner.into_vec());
        assert!(ControlResponse::parse(&bytes).is_err());
    }
}
