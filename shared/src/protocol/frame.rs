use holosync_serde::{BufferPool, ByteReader, ByteWrite, Serde, SerdeErr, VarInt};

use super::{packets::Packet, revision::ProtocolRevision};

/// Frames a body as `varint(length) ++ varint(packet id) ++ body`.
///
/// The body is written into a buffer borrowed from `pool` and copied out
/// once, so steady-state encoding does not allocate scratch space.
pub fn encode_frame(
    pool: &BufferPool,
    packet_id: i32,
    write_body: impl FnOnce(&mut dyn ByteWrite) -> Result<(), SerdeErr>,
) -> Result<Box<[u8]>, SerdeErr> {
    let mut body = pool.acquire();
    VarInt(packet_id).ser(&mut body)?;
    write_body(&mut body)?;

    let mut frame = pool.acquire();
    VarInt::from_length(body.as_slice().len())?.ser(&mut frame)?;
    frame.write_bytes(body.as_slice());
    Ok(frame.to_payload())
}

pub fn encode_packet<P: Packet>(
    pool: &BufferPool,
    revision: &ProtocolRevision,
    packet: &P,
) -> Result<Box<[u8]>, SerdeErr> {
    encode_frame(pool, P::packet_id(revision), |writer| {
        packet.write(revision, writer)
    })
}

/// Splits one complete frame into its packet id and body.
///
/// Fewer bytes than the declared length is truncation; more is a mismatch.
pub fn decode_frame(frame: &[u8]) -> Result<(i32, &[u8]), SerdeErr> {
    let mut reader = ByteReader::new(frame);
    let length = VarInt::de_length(&mut reader)?;
    let contents = reader.read_bytes(length)?;
    if !reader.is_empty() {
        return Err(SerdeErr::FrameLengthMismatch {
            declared: length,
            actual: length + reader.remaining(),
        });
    }
    let mut contents = ByteReader::new(contents);
    let packet_id = VarInt::de(&mut contents)?.get();
    let body = contents.read_bytes(contents.remaining())?;
    Ok((packet_id, body))
}

/// Decodes a frame that must carry a `P`, with nothing left over
pub fn decode_packet<P: Packet>(revision: &ProtocolRevision, frame: &[u8]) -> Result<P, SerdeErr> {
    let (packet_id, body) = decode_frame(frame)?;
    let expected = P::packet_id(revision);
    if packet_id != expected {
        return Err(SerdeErr::UnexpectedPacketId {
            expected,
            found: packet_id,
        });
    }
    let mut reader = ByteReader::new(body);
    let packet = P::read(revision, &mut reader)?;
    if !reader.is_empty() {
        return Err(SerdeErr::FrameLengthMismatch {
            declared: body.len(),
            actual: reader.position(),
        });
    }
    Ok(packet)
}
