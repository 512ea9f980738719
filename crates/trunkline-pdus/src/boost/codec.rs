use bitcode::{Decode, Encode};

use super::event::BoostEvent;

pub const BOOST_PDU_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecErr {
    DecodeFailed(String),
    VersionMismatch { expected: u8, found: u8 },
}

impl core::fmt::Display for CodecErr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CodecErr::DecodeFailed(e) => write!(f, "decode failed: {}", e),
            CodecErr::VersionMismatch { expected, found } => {
                write!(f, "boost pdu version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

#[derive(Encode, Decode)]
struct BoostEnvelope {
    version: u8,
    event: BoostEvent,
}

/// Codec for boost signaling events using bitcode for serialization
#[derive(Default)]
pub struct BoostCodec;

impl BoostCodec {
    /// Encode a BoostEvent for the wire
    pub fn encode(&self, event: &BoostEvent) -> Vec<u8> {
        bitcode::encode(&BoostEnvelope {
            version: BOOST_PDU_VERSION,
            event: event.clone(),
        })
    }

    /// Decode a datagram into a BoostEvent
    pub fn decode(&self, payload: &[u8]) -> Result<BoostEvent, CodecErr> {
        let envelope: BoostEnvelope =
            bitcode::decode(payload).map_err(|e| CodecErr::DecodeFailed(format!("{}", e)))?;
        if envelope.version != BOOST_PDU_VERSION {
            return Err(CodecErr::VersionMismatch {
                expected: BOOST_PDU_VERSION,
                found: envelope.version,
            });
        }
        Ok(envelope.event)
    }
}
