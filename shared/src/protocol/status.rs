//! Server list ping: the handshake/status exchange the pinger performs.
//!
//! These packets do not vary by host revision.

use holosync_serde::{BufferPool, ByteReader, Serde, SerdeErr, VarInt};

use super::frame::{decode_frame, encode_frame};

pub const HANDSHAKE_PACKET_ID: i32 = 0x00;
pub const STATUS_REQUEST_PACKET_ID: i32 = 0x00;
pub const STATUS_RESPONSE_PACKET_ID: i32 = 0x00;
/// Handshake intent asking for server status
pub const NEXT_STATE_STATUS: i32 = 1;
/// Protocol number sent by the pinger; servers answer status for any value
pub const PING_PROTOCOL_VERSION: i32 = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandshakePacket {
    pub protocol_version: i32,
    pub address: String,
    pub port: u16,
    pub next_state: i32,
}

impl HandshakePacket {
    pub fn status(address: impl Into<String>, port: u16) -> Self {
        Self {
            protocol_version: PING_PROTOCOL_VERSION,
            address: address.into(),
            port,
            next_state: NEXT_STATE_STATUS,
        }
    }

    pub fn encode(&self, pool: &BufferPool) -> Result<Box<[u8]>, SerdeErr> {
        encode_frame(pool, HANDSHAKE_PACKET_ID, |writer| {
            VarInt(self.protocol_version).ser(writer)?;
            self.address.ser(writer)?;
            self.port.ser(writer)?;
            VarInt(self.next_state).ser(writer)
        })
    }

    pub fn decode(frame: &[u8]) -> Result<Self, SerdeErr> {
        let mut reader = expect_packet(frame, HANDSHAKE_PACKET_ID)?;
        Ok(Self {
            protocol_version: VarInt::de(&mut reader)?.get(),
            address: String::de(&mut reader)?,
            port: u16::de(&mut reader)?,
            next_state: VarInt::de(&mut reader)?.get(),
        })
    }
}

/// The empty packet that follows the handshake
pub fn encode_status_request(pool: &BufferPool) -> Result<Box<[u8]>, SerdeErr> {
    encode_frame(pool, STATUS_REQUEST_PACKET_ID, |_| Ok(()))
}

/// The server's answer: a JSON document, opaque at this layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    pub json: String,
}

impl StatusResponse {
    pub fn encode(&self, pool: &BufferPool) -> Result<Box<[u8]>, SerdeErr> {
        encode_frame(pool, STATUS_RESPONSE_PACKET_ID, |writer| self.json.ser(writer))
    }

    /// Decodes the contents of a frame (everything after the length prefix)
    pub fn decode_contents(contents: &[u8]) -> Result<Self, SerdeErr> {
        let mut reader = ByteReader::new(contents);
        let packet_id = VarInt::de(&mut reader)?.get();
        if packet_id != STATUS_RESPONSE_PACKET_ID {
            return Err(SerdeErr::UnexpectedPacketId {
                expected: STATUS_RESPONSE_PACKET_ID,
                found: packet_id,
            });
        }
        Ok(Self {
            json: String::de(&mut reader)?,
        })
    }
}

fn expect_packet(frame: &[u8], expected: i32) -> Result<ByteReader<'_>, SerdeErr> {
    let (packet_id, body) = decode_frame(frame)?;
    if packet_id != expected {
        return Err(SerdeErr::UnexpectedPacketId {
            expected,
            found: packet_id,
        });
    }
    Ok(ByteReader::new(body))
}
